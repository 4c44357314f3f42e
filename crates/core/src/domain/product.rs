use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Currency applied to records that do not carry one.
pub const DEFAULT_CURRENCY: &str = "CAD";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub Uuid);

impl ProductId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A catalog record as the store holds it.
///
/// `images` and `on_sale` carry the raw serialized JSON exactly as persisted;
/// they are only interpreted when a record is projected into a
/// [`ProductResponse`](crate::catalog::ProductResponse).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Product {
    pub id: ProductId,
    pub slug: String,
    pub name: String,
    pub description: Option<String>,
    pub long_description: Option<String>,
    pub category: Option<String>,
    pub price_cents: i64,
    pub currency: String,
    pub images: Option<String>,
    pub material: Option<String>,
    pub is_active: bool,
    pub is_featured: bool,
    pub stock_qty: Option<i64>,
    pub is_customizable: bool,
    pub tags: Vec<String>,
    pub on_sale: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Creates an active, untracked-stock record with a fresh id and both
    /// timestamps set to now.
    pub fn new(slug: impl Into<String>, name: impl Into<String>, price_cents: i64) -> Self {
        let now = Utc::now();
        Self {
            id: ProductId::generate(),
            slug: slug.into(),
            name: name.into(),
            description: None,
            long_description: None,
            category: None,
            price_cents,
            currency: DEFAULT_CURRENCY.to_string(),
            images: None,
            material: None,
            is_active: true,
            is_featured: false,
            stock_qty: None,
            is_customizable: false,
            tags: Vec::new(),
            on_sale: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Soft-delete predicate shared by every read path.
    pub fn is_visible(&self) -> bool {
        self.is_active
    }

    /// Case-insensitive category comparison using Unicode lowercase
    /// mapping. A blank filter never matches.
    pub fn in_category(&self, category: &str) -> bool {
        if category.is_empty() {
            return false;
        }
        self.category.as_deref().is_some_and(|own| own.to_lowercase() == category.to_lowercase())
    }
}
