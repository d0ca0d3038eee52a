//! Listing URL construction
//!
//! Turns a category plus sparse filter options into a fully-qualified
//! listing URL. Building never fails: filter values are substituted
//! verbatim and assumed to already be URL-safe.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Default number of products taken from a listing page
pub const DEFAULT_LIMIT: usize = 5;

/// Filter names the catalog understands
///
/// The declaration order is the order pairs appear in the query string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FilterKey {
    ActivationDate,
    PriceFrom,
    PriceTo,
    Order,
    Brand,
}

impl FilterKey {
    /// All recognized keys, in query-string order
    pub const ALL: [FilterKey; 5] = [
        FilterKey::ActivationDate,
        FilterKey::PriceFrom,
        FilterKey::PriceTo,
        FilterKey::Order,
        FilterKey::Brand,
    ];

    /// Name used in the query string
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ActivationDate => "activation_date",
            Self::PriceFrom => "price_from",
            Self::PriceTo => "price_to",
            Self::Order => "order",
            Self::Brand => "brand",
        }
    }

    /// Looks up a recognized key by its query-string name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.as_str() == name)
    }
}

/// Listing sort orders supported by the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum SortOrder {
    #[value(name = "sale")]
    Sale,
    #[value(name = "popularity")]
    Popularity,
    #[value(name = "price_asc")]
    PriceAsc,
    #[value(name = "price_desc")]
    PriceDesc,
    #[value(name = "newest")]
    Newest,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sale => "sale",
            Self::Popularity => "popularity",
            Self::PriceAsc => "price_asc",
            Self::PriceDesc => "price_desc",
            Self::Newest => "newest",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sale" => Ok(Self::Sale),
            "popularity" => Ok(Self::Popularity),
            "price_asc" => Ok(Self::PriceAsc),
            "price_desc" => Ok(Self::PriceDesc),
            "newest" => Ok(Self::Newest),
            other => Err(format!("unknown sort order '{}'", other)),
        }
    }
}

/// Sparse set of listing filters
///
/// Values are kept as the raw text that will be substituted into the URL.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingFilters {
    values: HashMap<FilterKey, String>,
}

impl ListingFilters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds filters from loosely-typed name/value pairs
    ///
    /// Unrecognized names are ignored. A repeated name keeps the last value.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut filters = Self::new();
        for (name, value) in pairs {
            match FilterKey::from_name(name.as_ref()) {
                Some(key) => filters.set(key, value),
                None => tracing::debug!("Ignoring unrecognized filter '{}'", name.as_ref()),
            }
        }
        filters
    }

    pub fn set(&mut self, key: FilterKey, value: impl Into<String>) {
        self.values.insert(key, value.into());
    }

    pub fn get(&self, key: FilterKey) -> Option<&str> {
        self.values.get(&key).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Restricts to products added within the last `days` days
    pub fn new_arrivals(mut self, days: u32) -> Self {
        self.set(FilterKey::ActivationDate, format!("0-{}", days));
        self
    }

    pub fn price_from(mut self, price: u32) -> Self {
        self.set(FilterKey::PriceFrom, price.to_string());
        self
    }

    pub fn price_to(mut self, price: u32) -> Self {
        self.set(FilterKey::PriceTo, price.to_string());
        self
    }

    pub fn order(mut self, order: SortOrder) -> Self {
        self.set(FilterKey::Order, order.as_str());
        self
    }

    pub fn brand(mut self, brand: impl Into<String>) -> Self {
        self.set(FilterKey::Brand, brand);
        self
    }

    /// Present filters in query-string order
    pub fn iter(&self) -> impl Iterator<Item = (FilterKey, &str)> + '_ {
        FilterKey::ALL
            .iter()
            .filter_map(move |key| self.get(*key).map(|value| (*key, value)))
    }
}

/// Input to the listing URL builder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryQuery {
    pub category: String,
    pub filters: ListingFilters,
    /// Maximum number of products to take; never affects the URL
    pub limit: usize,
}

impl CategoryQuery {
    pub fn new(category: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            filters: ListingFilters::new(),
            limit: DEFAULT_LIMIT,
        }
    }

    pub fn with_filters(mut self, filters: ListingFilters) -> Self {
        self.filters = filters;
        self
    }

    /// Sets the product limit; zero is raised to one
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit.max(1);
        self
    }

    /// Listing URL for this query under `origin`
    pub fn listing_url(&self, origin: &str) -> String {
        build_listing_url(origin, &self.category, &self.filters)
    }
}

/// Builds the listing URL for a category and filter set
///
/// # Examples
///
/// ```
/// use shelf_drift::url::{build_listing_url, ListingFilters, SortOrder};
///
/// let filters = ListingFilters::new().order(SortOrder::Newest).price_to(50);
/// let url = build_listing_url("https://www.zalando.fr", "mode-femme", &filters);
/// assert_eq!(url, "https://www.zalando.fr/mode-femme/?price_to=50&order=newest");
/// ```
pub fn build_listing_url(origin: &str, category: &str, filters: &ListingFilters) -> String {
    let mut url = format!("{}/{}/", origin.trim_end_matches('/'), category);

    let params: Vec<String> = filters
        .iter()
        .map(|(key, value)| format!("{}={}", key.as_str(), value))
        .collect();

    if !params.is_empty() {
        url.push('?');
        url.push_str(&params.join("&"));
    }

    url
}
