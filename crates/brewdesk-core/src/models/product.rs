use serde::{Deserialize, Serialize};

use crate::utils::contains_ignore_case;

/// Categories offered when creating or editing a product
pub const PRODUCT_CATEGORIES: [&str; 8] = [
    "Hot Coffee",
    "Cold Brew",
    "Espresso",
    "Cappuccino",
    "Latte",
    "Tea",
    "Bakery",
    "Specialty",
];

/// The catalogue spelling of a category, matched case-insensitively
pub fn canonical_category(value: &str) -> Option<&'static str> {
    let value = value.trim();
    PRODUCT_CATEGORIES
        .iter()
        .copied()
        .find(|category| category.eq_ignore_ascii_case(value))
}

/// Stock level given to new products when none is entered
pub const DEFAULT_STOCK: i64 = 100;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Product {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub price: f64,
    pub image: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub rating: Option<f64>,
    pub brew_time: Option<String>,
    #[serde(default = "default_true")]
    pub is_available: bool,
    #[serde(default)]
    pub stock: i64,
}

fn default_true() -> bool {
    true
}

impl Product {
    pub fn category_display(&self) -> &str {
        self.category.as_deref().filter(|c| !c.is_empty()).unwrap_or("Uncategorized")
    }

    pub fn availability_display(&self) -> &'static str {
        if !self.is_available {
            "Unavailable"
        } else if self.stock <= 0 {
            "Out of stock"
        } else {
            "Available"
        }
    }
}

/// Request body for creating or replacing a product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct ProductInput {
    pub name: String,
    pub price: f64,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub brew_time: String,
    pub is_available: bool,
    pub stock: i64,
}

impl ProductInput {
    pub fn new(name: impl Into<String>, price: f64) -> Self {
        Self {
            name: name.into(),
            price,
            image: String::new(),
            description: String::new(),
            category: String::new(),
            rating: 0.0,
            brew_time: String::new(),
            is_available: true,
            stock: DEFAULT_STOCK,
        }
    }

    /// Pre-fill an edit form from an existing product
    pub fn from_product(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            price: product.price,
            image: product.image.clone().unwrap_or_default(),
            description: product.description.clone().unwrap_or_default(),
            category: product.category.clone().unwrap_or_default(),
            rating: product.rating.unwrap_or(0.0),
            brew_time: product.brew_time.clone().unwrap_or_default(),
            is_available: product.is_available,
            stock: product.stock,
        }
    }

    /// Check the fields the backend would otherwise reject with a 400
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Product name is required".to_string());
        }
        if !self.price.is_finite() || self.price < 0.0 {
            return Err("Price must be a non-negative number".to_string());
        }
        if !(0.0..=5.0).contains(&self.rating) {
            return Err("Rating must be between 0 and 5".to_string());
        }
        if self.stock < 0 {
            return Err("Stock cannot be negative".to_string());
        }
        if !self.category.trim().is_empty() && canonical_category(&self.category).is_none() {
            return Err(format!(
                "Unknown category '{}'. Expected one of: {}",
                self.category.trim(),
                PRODUCT_CATEGORIES.join(", ")
            ));
        }
        Ok(())
    }
}

/// Search and category filter for the products list
#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    pub search: String,
    /// `None` (or "all" via [`ProductFilter::with_category`]) matches every category
    pub category: Option<String>,
}

impl ProductFilter {
    pub fn with_category(mut self, category: &str) -> Self {
        let category = category.trim();
        self.category = if category.is_empty() || category.eq_ignore_ascii_case("all") {
            None
        } else {
            Some(category.to_string())
        };
        self
    }

    pub fn matches(&self, product: &Product) -> bool {
        let query = self.search.trim();
        let matches_search = query.is_empty()
            || contains_ignore_case(&product.name, query)
            || product
                .description
                .as_deref()
                .is_some_and(|d| contains_ignore_case(d, query));
        let matches_category = match &self.category {
            Some(category) => product.category.as_deref() == Some(category.as_str()),
            None => true,
        };
        matches_search && matches_category
    }

    pub fn apply<'a>(&self, products: &'a [Product]) -> Vec<&'a Product> {
        products.iter().filter(|p| self.matches(p)).collect()
    }
}

/// Distinct non-empty categories in first-seen order
pub fn product_categories(products: &[Product]) -> Vec<String> {
    let mut categories: Vec<String> = Vec::new();
    for category in products.iter().filter_map(|p| p.category.as_deref()) {
        if !category.is_empty() && !categories.iter().any(|c| c == category) {
            categories.push(category.to_string());
        }
    }
    categories
}
