use crate::product::Product;
use std::cmp::Ordering;

/// Price ordering applied to a fetched page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    None,
    Ascending,
    Descending,
}

impl SortOrder {
    pub fn next(self) -> Self {
        match self {
            Self::None => Self::Ascending,
            Self::Ascending => Self::Descending,
            Self::Descending => Self::None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::None => "Sort By Price",
            Self::Ascending => "Low to High",
            Self::Descending => "High to Low",
        }
    }

    /// Parse the command-line spelling (`asc` / `desc`).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "none" => Some(Self::None),
            "asc" | "ascending" => Some(Self::Ascending),
            "desc" | "descending" => Some(Self::Descending),
            _ => None,
        }
    }
}

/// Everything the table view fetches and filters by.
///
/// Snapshots are passed by value through the fetch pipeline; the table view
/// replaces its copy on every control change rather than mutating a shared one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryState {
    /// 1-based page number sent to the catalog API.
    pub page: u32,
    pub search: String,
    /// Empty means all categories.
    pub category: String,
    pub sort: SortOrder,
}

impl Default for QueryState {
    fn default() -> Self {
        Self {
            page: 1,
            search: String::new(),
            category: String::new(),
            sort: SortOrder::None,
        }
    }
}

impl QueryState {
    pub fn with_page(&self, page: u32) -> Self {
        Self {
            page: page.max(1),
            ..self.clone()
        }
    }

    pub fn with_search(&self, search: impl Into<String>) -> Self {
        Self {
            search: search.into(),
            ..self.clone()
        }
    }

    pub fn with_category(&self, category: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            ..self.clone()
        }
    }

    pub fn with_sort(&self, sort: SortOrder) -> Self {
        Self {
            sort,
            ..self.clone()
        }
    }
}

/// Filter and order one fetched page.
///
/// Rows without an identifier are dropped, then the search term (case
/// insensitive, against the name) and category (exact) filters apply, then
/// a stable price sort.
pub fn apply(products: Vec<Product>, query: &QueryState) -> Vec<Product> {
    let needle = query.search.to_lowercase();

    let mut out: Vec<Product> = products
        .into_iter()
        .filter(|p| p.id.is_some())
        .filter(|p| needle.is_empty() || p.name.to_lowercase().contains(&needle))
        .filter(|p| query.category.is_empty() || p.category == query.category)
        .collect();

    // `sort_by` is stable, so equal prices keep their input order.
    match query.sort {
        SortOrder::None => {}
        SortOrder::Ascending => out.sort_by(|a, b| cmp_price(a, b)),
        SortOrder::Descending => out.sort_by(|a, b| cmp_price(b, a)),
    }
    out
}

fn cmp_price(a: &Product, b: &Product) -> Ordering {
    a.price.total_cmp(&b.price)
}
