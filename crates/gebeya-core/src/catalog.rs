//! # Catalog Query Model
//!
//! Filters, sort keys and pagination for product listings. The SQL lives in
//! `gebeya-db`; this module decides what a request means.
//!
//! ## Request → Query
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  GET /products?search=rose&category=Skin&maxPrice=25&sort=price_low     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  CatalogParams (raw strings, all optional)                             │
//! │       │  into_query()                                                  │
//! │       ▼                                                                 │
//! │  CatalogQuery                                                          │
//! │  ├── ProductFilters { search: "rose", category: "skin",                │
//! │  │                    max_price_cents: 2500, ... }   (AND-combined)    │
//! │  ├── SortKey::PriceLow                                                 │
//! │  └── PageRequest { page: 1, page_size: 20 }                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Page<Product> { items, totalCount, currentPage, pageSize, totalPages }│
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Text filters are case-insensitive substring matches. Terms and the
//! products' match columns both go through [`fold_case`].

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use ts_rs::TS;

use crate::error::{CoreResult, FieldErrors, ValidationError};
use crate::types::Product;

/// Default number of products per page.
pub const DEFAULT_PAGE_SIZE: i64 = 20;

/// Largest page a caller may ask for.
pub const MAX_PAGE_SIZE: i64 = 100;

/// Longest accepted filter string.
pub const MAX_FILTER_LEN: usize = 100;

/// Number of names returned by the search suggestion box.
pub const SUGGESTION_LIMIT: i64 = 8;

// =============================================================================
// Filters
// =============================================================================

/// Product filters. Every present filter must match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFilters {
    /// Substring of name, brand, category or type.
    pub search: Option<String>,
    /// Substring of category.
    pub category: Option<String>,
    /// Substring of type.
    pub product_type: Option<String>,
    /// Inclusive price ceiling.
    pub max_price_cents: Option<i64>,
    /// Only products flagged as deals.
    pub deals_only: bool,
}

impl ProductFilters {
    /// Category filter used by the home page slices.
    pub fn category(name: &str) -> Self {
        ProductFilters {
            category: normalize_text(Some(name)),
            ..Default::default()
        }
    }

    pub fn deals() -> Self {
        ProductFilters {
            deals_only: true,
            ..Default::default()
        }
    }

    pub fn search(term: &str) -> Self {
        ProductFilters {
            search: normalize_text(Some(term)),
            ..Default::default()
        }
    }
}

/// Case-folded form of catalog text, for both the stored match columns and
/// the filter terms. Full Unicode lowercasing, so "CRÈME" matches "crème".
///
/// ```rust
/// use gebeya_core::catalog::fold_case;
///
/// assert_eq!(fold_case(" L'ORÉAL "), "l'oréal");
/// ```
pub fn fold_case(value: &str) -> String {
    value.trim().to_lowercase()
}

/// Trims and case-folds a filter value; blank becomes `None`.
fn normalize_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(fold_case)
}

// =============================================================================
// Sort
// =============================================================================

/// Listing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum SortKey {
    /// Highest id first.
    #[default]
    Newest,
    /// Highest rating first, then most reviewed.
    Popular,
    /// Cheapest first.
    PriceLow,
    /// Most expensive first.
    PriceHigh,
}

impl SortKey {
    pub const ALL: [SortKey; 4] = [
        SortKey::Newest,
        SortKey::Popular,
        SortKey::PriceLow,
        SortKey::PriceHigh,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::Newest => "newest",
            SortKey::Popular => "popular",
            SortKey::PriceLow => "price_low",
            SortKey::PriceHigh => "price_high",
        }
    }
}

impl FromStr for SortKey {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SortKey::ALL
            .into_iter()
            .find(|key| key.as_str() == s.trim())
            .ok_or_else(|| ValidationError::NotAllowed {
                field: "sort".to_string(),
                allowed: SortKey::ALL.iter().map(|k| k.as_str().to_string()).collect(),
            })
    }
}

// =============================================================================
// Pagination
// =============================================================================

/// A validated 1-indexed page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: i64,
    page_size: i64,
}

impl PageRequest {
    /// Validates page ≥ 1 and 1 ≤ page_size ≤ [`MAX_PAGE_SIZE`].
    pub fn new(page: i64, page_size: i64) -> Result<Self, ValidationError> {
        if page < 1 {
            return Err(ValidationError::OutOfRange {
                field: "page".to_string(),
                min: 1,
                max: i64::MAX,
            });
        }
        if !(1..=MAX_PAGE_SIZE).contains(&page_size) {
            return Err(ValidationError::OutOfRange {
                field: "pageSize".to_string(),
                min: 1,
                max: MAX_PAGE_SIZE,
            });
        }
        Ok(PageRequest { page, page_size })
    }

    /// First page of `limit` items, for fixed-size slices.
    pub fn first(limit: i64) -> Self {
        PageRequest {
            page: 1,
            page_size: limit.clamp(1, MAX_PAGE_SIZE),
        }
    }

    #[inline]
    pub fn page(&self) -> i64 {
        self.page
    }

    #[inline]
    pub fn page_size(&self) -> i64 {
        self.page_size
    }

    /// Rows to skip. Saturates for absurd page numbers, which then simply
    /// land past the end.
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.page_size)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        PageRequest {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// One page of results.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total_count: i64,
    pub current_page: i64,
    pub page_size: i64,
    pub total_pages: i64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total_count: i64, request: PageRequest) -> Self {
        let total_pages = if total_count == 0 {
            0
        } else {
            (total_count + request.page_size - 1) / request.page_size
        };
        Page {
            items,
            total_count,
            current_page: request.page,
            page_size: request.page_size,
            total_pages,
        }
    }
}

// =============================================================================
// Query
// =============================================================================

/// A fully validated catalog query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogQuery {
    pub filters: ProductFilters,
    pub sort: SortKey,
    pub page: PageRequest,
}

/// Raw `GET /products` query string.
///
/// Everything arrives as text so that a malformed number becomes a field
/// error instead of a rejected request.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogParams {
    pub search: Option<String>,
    pub category: Option<String>,
    #[serde(rename = "type")]
    pub product_type: Option<String>,
    /// Decimal dollars, e.g. `25` or `25.50`.
    pub max_price: Option<String>,
    pub sort: Option<String>,
    pub page: Option<String>,
    pub page_size: Option<String>,
    pub deals_only: Option<String>,
}

impl CatalogParams {
    /// Validates and normalizes the parameters.
    ///
    /// ## Errors
    /// `CoreError::InvalidFields` naming each bad parameter (page below 1,
    /// unknown sort, unparseable price, ...).
    pub fn into_query(self, default_page_size: i64) -> CoreResult<CatalogQuery> {
        let mut errors = FieldErrors::new();

        for (field, value) in [
            ("search", &self.search),
            ("category", &self.category),
            ("type", &self.product_type),
        ] {
            if let Some(value) = value {
                if value.trim().chars().count() > MAX_FILTER_LEN {
                    errors.push(ValidationError::TooLong {
                        field: field.to_string(),
                        max: MAX_FILTER_LEN,
                    });
                }
            }
        }

        let max_price_cents = match blank_to_none(self.max_price.as_deref()) {
            None => None,
            Some(raw) => match parse_price_cents("maxPrice", raw) {
                Ok(cents) => Some(cents),
                Err(err) => {
                    errors.push(err);
                    None
                }
            },
        };

        let sort = match blank_to_none(self.sort.as_deref()) {
            None => SortKey::default(),
            Some(raw) => raw.parse::<SortKey>().unwrap_or_else(|err| {
                errors.push(err);
                SortKey::default()
            }),
        };

        let page = parse_int("page", self.page.as_deref(), 1, &mut errors);
        let page_size = parse_int("pageSize", self.page_size.as_deref(), default_page_size, &mut errors);

        let deals_only = match blank_to_none(self.deals_only.as_deref()) {
            None | Some("false") | Some("0") => false,
            Some("true") | Some("1") => true,
            Some(_) => {
                errors.push(ValidationError::InvalidFormat {
                    field: "dealsOnly".to_string(),
                    reason: "must be true or false".to_string(),
                });
                false
            }
        };

        let page = match PageRequest::new(page, page_size) {
            Ok(page) => page,
            Err(err) => {
                errors.push(err);
                PageRequest::default()
            }
        };

        errors.into_result()?;

        Ok(CatalogQuery {
            filters: ProductFilters {
                search: normalize_text(self.search.as_deref()),
                category: normalize_text(self.category.as_deref()),
                product_type: normalize_text(self.product_type.as_deref()),
                max_price_cents,
                deals_only,
            },
            sort,
            page,
        })
    }
}

fn blank_to_none(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn parse_int(field: &str, raw: Option<&str>, default: i64, errors: &mut FieldErrors) -> i64 {
    match blank_to_none(raw) {
        None => default,
        Some(raw) => raw.parse::<i64>().unwrap_or_else(|_| {
            errors.push(ValidationError::InvalidFormat {
                field: field.to_string(),
                reason: "must be a whole number".to_string(),
            });
            default
        }),
    }
}

/// Parses a non-negative decimal dollar amount with at most two decimals
/// into cents, without going through floating point.
///
/// ## Example
/// ```rust
/// use gebeya_core::catalog::parse_price_cents;
///
/// assert_eq!(parse_price_cents("maxPrice", "25").unwrap(), 2500);
/// assert_eq!(parse_price_cents("maxPrice", "19.9").unwrap(), 1990);
/// assert!(parse_price_cents("maxPrice", "1.999").is_err());
/// ```
pub fn parse_price_cents(field: &str, raw: &str) -> Result<i64, ValidationError> {
    let invalid = || ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: "must be a non-negative amount with at most two decimals".to_string(),
    };

    let raw = raw.trim();
    let (whole, fraction) = raw.split_once('.').unwrap_or((raw, ""));

    let all_digits = |s: &str| s.chars().all(|c| c.is_ascii_digit());
    if whole.is_empty() || !all_digits(whole) || fraction.len() > 2 || !all_digits(fraction) {
        return Err(invalid());
    }
    if raw.ends_with('.') {
        return Err(invalid());
    }

    let dollars: i64 = whole.parse().map_err(|_| invalid())?;
    let cents: i64 = match fraction.len() {
        0 => 0,
        1 => fraction.parse::<i64>().map_err(|_| invalid())? * 10,
        _ => fraction.parse().map_err(|_| invalid())?,
    };

    dollars
        .checked_mul(100)
        .and_then(|d| d.checked_add(cents))
        .ok_or_else(invalid)
}

// =============================================================================
// Product Page & Home Page
// =============================================================================

/// `GET /products/{id}` response.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ProductDetails {
    pub product: Product,
    /// Other products of the same category.
    pub related: Vec<Product>,
}

/// Named home page lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HomeSection {
    Featured,
    New,
    Popular,
    Makeup,
    Skincare,
}

impl HomeSection {
    pub const ALL: [HomeSection; 5] = [
        HomeSection::Featured,
        HomeSection::New,
        HomeSection::Popular,
        HomeSection::Makeup,
        HomeSection::Skincare,
    ];

    /// The listing query that fills this section.
    pub fn query(&self) -> CatalogQuery {
        let (filters, sort, limit) = match self {
            HomeSection::Featured => (ProductFilters::deals(), SortKey::Popular, 8),
            HomeSection::New => (ProductFilters::default(), SortKey::Newest, 25),
            HomeSection::Popular => (ProductFilters::default(), SortKey::Popular, 25),
            HomeSection::Makeup => (ProductFilters::category("makeup"), SortKey::Newest, 8),
            HomeSection::Skincare => (ProductFilters::category("skincare"), SortKey::Newest, 8),
        };
        CatalogQuery {
            filters,
            sort,
            page: PageRequest::first(limit),
        }
    }
}

/// `GET /` response: the five home page lists.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct HomePage {
    pub featured: Vec<Product>,
    pub new: Vec<Product>,
    pub popular: Vec<Product>,
    pub makeup: Vec<Product>,
    pub skincare: Vec<Product>,
}

impl HomePage {
    pub fn set(&mut self, section: HomeSection, products: Vec<Product>) {
        let slot = match section {
            HomeSection::Featured => &mut self.featured,
            HomeSection::New => &mut self.new,
            HomeSection::Popular => &mut self.popular,
            HomeSection::Makeup => &mut self.makeup,
            HomeSection::Skincare => &mut self.skincare,
        };
        *slot = products;
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;

    fn params() -> CatalogParams {
        CatalogParams::default()
    }

    #[test]
    fn test_defaults() {
        let query = params().into_query(DEFAULT_PAGE_SIZE).unwrap();
        assert_eq!(query.sort, SortKey::Newest);
        assert_eq!(query.page.page(), 1);
        assert_eq!(query.page.page_size(), 20);
        assert_eq!(query.filters, ProductFilters::default());
    }

    #[test]
    fn test_filters_are_normalized() {
        let query = CatalogParams {
            search: Some("  Rose ".to_string()),
            category: Some("SkinCare".to_string()),
            product_type: Some("   ".to_string()),
            max_price: Some("25.5".to_string()),
            sort: Some("price_low".to_string()),
            deals_only: Some("true".to_string()),
            ..params()
        }
        .into_query(DEFAULT_PAGE_SIZE)
        .unwrap();

        assert_eq!(query.filters.search.as_deref(), Some("rose"));
        assert_eq!(query.filters.category.as_deref(), Some("skincare"));
        assert_eq!(query.filters.product_type, None);
        assert_eq!(query.filters.max_price_cents, Some(2550));
        assert!(query.filters.deals_only);
        assert_eq!(query.sort, SortKey::PriceLow);
    }

    #[test]
    fn test_filters_fold_non_ascii_letters() {
        let query = CatalogParams {
            search: Some("CRÈME".to_string()),
            category: Some("Soins Visage".to_string()),
            ..params()
        }
        .into_query(DEFAULT_PAGE_SIZE)
        .unwrap();

        assert_eq!(query.filters.search.as_deref(), Some("crème"));
        assert_eq!(query.filters.category.as_deref(), Some("soins visage"));
        assert_eq!(fold_case("ÉCLAT"), "éclat");
    }

    #[test]
    fn test_page_below_one_is_rejected() {
        for page in ["0", "-1"] {
            let err = CatalogParams {
                page: Some(page.to_string()),
                ..params()
            }
            .into_query(DEFAULT_PAGE_SIZE)
            .unwrap_err();
            match err {
                CoreError::InvalidFields(fields) => assert!(fields.contains("page")),
                other => panic!("unexpected {:?}", other),
            }
        }
    }

    #[test]
    fn test_bad_parameters_are_all_reported() {
        let err = CatalogParams {
            sort: Some("cheapest".to_string()),
            page: Some("two".to_string()),
            page_size: Some("500".to_string()),
            max_price: Some("-3".to_string()),
            ..params()
        }
        .into_query(DEFAULT_PAGE_SIZE)
        .unwrap_err();

        match err {
            CoreError::InvalidFields(fields) => {
                assert!(fields.contains("sort"));
                assert!(fields.contains("page"));
                assert!(fields.contains("pageSize"));
                assert!(fields.contains("maxPrice"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_sort_key_parsing() {
        for key in SortKey::ALL {
            assert_eq!(key.as_str().parse::<SortKey>().unwrap(), key);
        }
        assert!("NEWEST".parse::<SortKey>().is_err());
    }

    #[test]
    fn test_parse_price_cents() {
        assert_eq!(parse_price_cents("p", "0").unwrap(), 0);
        assert_eq!(parse_price_cents("p", "10.05").unwrap(), 1005);
        assert!(parse_price_cents("p", "10.").is_err());
        assert!(parse_price_cents("p", ".5").is_err());
        assert!(parse_price_cents("p", "1e3").is_err());
        assert!(parse_price_cents("p", "99999999999999999999").is_err());
    }

    #[test]
    fn test_page_math() {
        let request = PageRequest::new(3, 20).unwrap();
        assert_eq!(request.offset(), 40);

        let page: Page<i64> = Page::new(vec![], 41, request);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.current_page, 3);

        let empty: Page<i64> = Page::new(vec![], 0, PageRequest::default());
        assert_eq!(empty.total_pages, 0);

        assert_eq!(PageRequest::new(i64::MAX, 100).unwrap().offset(), i64::MAX);
    }

    #[test]
    fn test_home_sections() {
        let featured = HomeSection::Featured.query();
        assert!(featured.filters.deals_only);
        assert_eq!(featured.page.page_size(), 8);

        let new = HomeSection::New.query();
        assert_eq!(new.sort, SortKey::Newest);
        assert_eq!(new.page.page_size(), 25);

        let skincare = HomeSection::Skincare.query();
        assert_eq!(skincare.filters.category.as_deref(), Some("skincare"));
    }
}
