//! Product card extraction
//!
//! Turns raw listing markup into product records. Card location and field
//! resolution are rule lists tried in order, so a markup change on the site
//! usually means editing one list here.
//!
//! Extraction is split in two steps so the orchestrator can pace between
//! cards without holding a parsed document across an await point:
//! `locate_cards` slices the page into owned card fragments, then
//! `CardExtractor` parses each fragment on demand.

use crate::crawler::fetcher::{RawListingPage, SelectorStrategy};
use crate::crawler::{ProductRecord, DEFAULT_CATEGORY, DEFAULT_SIZES};
use crate::url::{canonical_asset_url, resolve_href};
use crate::ExtractError;
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Placeholder when no name rule matches
pub const NAME_PLACEHOLDER: &str = "Product";

/// Placeholder when no price rule matches
pub const PRICE_PLACEHOLDER: &str = "N/A";

const LINK_RULES: &[&str] = &["a[href]"];
const NAME_RULES: &[&str] = &["h3", "div.cat_articleName"];
const BRAND_RULES: &[&str] = &["div.cat_brandName", "h2"];
const PRICE_RULES: &[&str] = &["p.cat_price", r#"span[data-testid="price"]"#];

/// Secondary card rule tried when the page's own rule finds nothing
const LEGACY_CARD_RULE: &str = "div.cat_articleCard";

/// Outer markup of one candidate product card
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardFragment {
    pub index: usize,
    pub markup: String,
}

/// Everything field resolution needs besides the card itself
#[derive(Debug, Clone)]
pub struct ExtractContext {
    /// Site origin used to absolutize relative links
    pub origin: Url,
    /// Site display name, the brand placeholder
    pub site_name: String,
}

/// Locates candidate product cards in a listing page
///
/// Takes up to twice `limit` candidates with the page's card rule, or the
/// legacy card rule when the first finds nothing, then keeps the first
/// `limit` of them.
///
/// # Arguments
///
/// * `page` - Raw listing markup and its card rule
/// * `limit` - Maximum number of cards to keep
pub fn locate_cards(page: &RawListingPage, limit: usize) -> Vec<CardFragment> {
    let document = Html::parse_document(&page.markup);
    let window = limit.saturating_mul(2);

    let mut cards = select_outer_html(&document, page.strategy.selector(), window);
    if cards.is_empty() && page.strategy != SelectorStrategy::GenericArticle {
        cards = select_outer_html(&document, LEGACY_CARD_RULE, window);
    }

    tracing::info!("Found {} candidate product cards", cards.len());

    cards
        .into_iter()
        .take(limit)
        .enumerate()
        .map(|(index, markup)| CardFragment { index, markup })
        .collect()
}

fn select_outer_html(document: &Html, css: &str, max: usize) -> Vec<String> {
    match Selector::parse(css) {
        Ok(selector) => document
            .select(&selector)
            .take(max)
            .map(|element| element.html())
            .collect(),
        Err(_) => {
            tracing::warn!("Invalid card selector '{}'", css);
            Vec::new()
        }
    }
}

/// Lazily extracts records from located cards, one card per step
pub struct CardExtractor {
    cards: std::vec::IntoIter<CardFragment>,
    context: ExtractContext,
}

impl CardExtractor {
    pub fn new(cards: Vec<CardFragment>, context: ExtractContext) -> Self {
        Self {
            cards: cards.into_iter(),
            context,
        }
    }

    /// Number of cards not yet extracted
    pub fn remaining(&self) -> usize {
        self.cards.len()
    }
}

impl Iterator for CardExtractor {
    type Item = (usize, Result<ProductRecord, ExtractError>);

    fn next(&mut self) -> Option<Self::Item> {
        let card = self.cards.next()?;
        let result = extract_card(&card.markup, &self.context);
        Some((card.index, result))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.cards.size_hint()
    }
}

/// Extracts one product record from a card's markup
///
/// A card without a link or without an image is rejected; every other
/// field falls back to a placeholder.
pub fn extract_card(markup: &str, context: &ExtractContext) -> Result<ProductRecord, ExtractError> {
    let fragment = Html::parse_fragment(markup);
    let card = fragment.root_element();

    let href = first_match(card, LINK_RULES)
        .and_then(|link| link.value().attr("href"))
        .ok_or(ExtractError::MissingLink)?;
    let product_url = resolve_href(&context.origin, href)
        .ok_or_else(|| ExtractError::InvalidUrl(href.to_string()))?;

    let src = image_source(card).ok_or(ExtractError::MissingImage)?;
    let image_url = canonical_asset_url(&context.origin, src)
        .ok_or_else(|| ExtractError::InvalidUrl(src.to_string()))?;

    let name = first_text(card, NAME_RULES).unwrap_or_else(|| NAME_PLACEHOLDER.to_string());
    let brand = first_text(card, BRAND_RULES).unwrap_or_else(|| context.site_name.clone());
    let price = first_text(card, PRICE_RULES).unwrap_or_else(|| PRICE_PLACEHOLDER.to_string());

    Ok(ProductRecord {
        description: format!("{} - {}", brand, name),
        name,
        brand,
        price,
        image_url: image_url.to_string(),
        product_url: product_url.to_string(),
        sizes: DEFAULT_SIZES.iter().map(|s| s.to_string()).collect(),
        category: DEFAULT_CATEGORY.to_string(),
    })
}

/// Extracts records from a whole page in one pass
///
/// Discarded cards are logged and skipped. The orchestrator uses
/// `CardExtractor` directly so it can pace between cards.
///
/// # Example
///
/// ```
/// use shelf_drift::crawler::{extract_products, ExtractContext, RawListingPage, SelectorStrategy};
/// use url::Url;
///
/// let page = RawListingPage {
///     url: "https://www.zalando.fr/mode-femme/".to_string(),
///     markup: r#"<article data-testid="product-card">
///         <a href="/robe-1.html"><img src="https://img.example/1.jpg?w=300"></a>
///         <h3>Robe</h3><p class="cat_price">39,99 €</p>
///     </article>"#.to_string(),
///     strategy: SelectorStrategy::ProductCard,
/// };
/// let context = ExtractContext {
///     origin: Url::parse("https://www.zalando.fr").unwrap(),
///     site_name: "Zalando".to_string(),
/// };
/// let records = extract_products(&page, 5, &context);
/// assert_eq!(records.len(), 1);
/// assert_eq!(records[0].image_url, "https://img.example/1.jpg");
/// ```
pub fn extract_products(
    page: &RawListingPage,
    limit: usize,
    context: &ExtractContext,
) -> Vec<ProductRecord> {
    CardExtractor::new(locate_cards(page, limit), context.clone())
        .filter_map(|(index, result)| match result {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!("Skipping card {}: {}", index + 1, e);
                None
            }
        })
        .collect()
}

/// First element matching any of `rules`, tried in order
fn first_match<'a>(scope: ElementRef<'a>, rules: &[&str]) -> Option<ElementRef<'a>> {
    rules.iter().find_map(|css| {
        let selector = Selector::parse(css).ok()?;
        scope.select(&selector).next()
    })
}

/// Normalized text of the first rule that yields non-empty text
fn first_text(scope: ElementRef<'_>, rules: &[&str]) -> Option<String> {
    rules.iter().find_map(|css| {
        let selector = Selector::parse(css).ok()?;
        let element = scope.select(&selector).next()?;
        let text = element.text().collect::<Vec<_>>().join(" ");
        let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
        (!text.is_empty()).then_some(text)
    })
}

/// Source of the card's first image, falling back to its lazy-load attribute
///
/// Inline `data:` placeholders are skipped.
fn image_source(scope: ElementRef<'_>) -> Option<&str> {
    let selector = Selector::parse("img").ok()?;
    let image = scope.select(&selector).next()?;
    ["src", "data-src"]
        .iter()
        .filter_map(|attr| image.value().attr(attr))
        .map(str::trim)
        .find(|value| !value.is_empty() && !is_inline_placeholder(value))
}

fn is_inline_placeholder(value: &str) -> bool {
    value
        .get(..5)
        .is_some_and(|scheme| scheme.eq_ignore_ascii_case("data:"))
}
