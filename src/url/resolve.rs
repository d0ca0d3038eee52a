use url::Url;

/// Resolves an href found in listing markup against the source origin
///
/// Handles absolute, root-relative, path-relative and protocol-relative
/// (`//cdn.example.com/...`) forms. Returns None for empty hrefs, fragment-only
/// anchors, non-navigational schemes, and anything that does not resolve to
/// http(s).
///
/// # Examples
///
/// ```
/// use shelf_drift::url::resolve_href;
/// use url::Url;
///
/// let origin = Url::parse("https://www.zalando.fr").unwrap();
/// let url = resolve_href(&origin, "/robe-longue.html").unwrap();
/// assert_eq!(url.as_str(), "https://www.zalando.fr/robe-longue.html");
/// ```
pub fn resolve_href(origin: &Url, href: &str) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    if href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return None;
    }

    let resolved = origin.join(href).ok()?;
    match resolved.scheme() {
        "http" | "https" => Some(resolved),
        _ => None,
    }
}

/// Canonical asset URL: the resolved image URL without query or fragment
///
/// Catalog CDNs encode resize and quality hints in the query string; dropping
/// it yields the full-size asset.
pub fn canonical_asset_url(origin: &Url, src: &str) -> Option<Url> {
    let mut url = resolve_href(origin, src)?;
    url.set_query(None);
    url.set_fragment(None);
    Some(url)
}
