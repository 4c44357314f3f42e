//! Public response shape of the catalog API and the projection that builds it
//! from stored [`Product`] records.
//!
//! The projection is total: the two embedded JSON columns (`images` and
//! `on_sale`) are parsed here and never fail the request. Malformed `images`
//! text degrades to a one-element list holding the raw text, malformed
//! `on_sale` text degrades to `null`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::domain::product::{Product, ProductId};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductResponse {
    pub id: ProductId,
    pub slug: String,
    pub name: String,
    pub description: Option<String>,
    pub long_description: Option<String>,
    pub category: Option<String>,
    pub price_cents: i64,
    pub currency: String,
    pub images: Vec<String>,
    pub material: Option<String>,
    pub is_active: bool,
    pub is_featured: bool,
    pub stock_qty: Option<i64>,
    pub is_customizable: bool,
    pub tags: Vec<String>,
    pub on_sale: Option<Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Product> for ProductResponse {
    fn from(product: &Product) -> Self {
        let images = decode_images(product.images.as_deref()).unwrap_or_else(|raw| {
            debug!(
                event_name = "catalog.projection.images_fallback",
                slug = %product.slug,
                "stored images text is not a JSON string array; using raw text"
            );
            vec![raw.to_string()]
        });

        let on_sale = decode_on_sale(product.on_sale.as_deref()).unwrap_or_else(|error| {
            debug!(
                event_name = "catalog.projection.on_sale_dropped",
                slug = %product.slug,
                error = %error,
                "stored on_sale text is not valid JSON; treating product as not on sale"
            );
            None
        });

        Self {
            id: product.id,
            slug: product.slug.clone(),
            name: product.name.clone(),
            description: product.description.clone(),
            long_description: product.long_description.clone(),
            category: product.category.clone(),
            price_cents: product.price_cents,
            currency: product.currency.clone(),
            images,
            material: product.material.clone(),
            is_active: product.is_active,
            is_featured: product.is_featured,
            stock_qty: product.stock_qty,
            is_customizable: product.is_customizable,
            tags: product.tags.clone(),
            on_sale,
            created_at: product.created_at,
            updated_at: product.updated_at,
        }
    }
}

impl From<Product> for ProductResponse {
    fn from(product: Product) -> Self {
        Self::from(&product)
    }
}

/// Reads the stored `images` column.
///
/// Blank or absent text yields an empty list, a JSON array of strings yields
/// that list, and anything else yields `[raw]` verbatim.
pub fn parse_images(raw: Option<&str>) -> Vec<String> {
    decode_images(raw).unwrap_or_else(|raw| vec![raw.to_string()])
}

/// Reads the stored `on_sale` column. Blank, absent, JSON `null` and
/// unparseable text all mean "not on sale".
pub fn parse_on_sale(raw: Option<&str>) -> Option<Value> {
    decode_on_sale(raw).unwrap_or(None)
}

fn decode_images(raw: Option<&str>) -> Result<Vec<String>, &str> {
    match non_blank(raw) {
        None => Ok(Vec::new()),
        Some(raw) => serde_json::from_str::<Vec<String>>(raw).map_err(|_| raw),
    }
}

fn decode_on_sale(raw: Option<&str>) -> Result<Option<Value>, serde_json::Error> {
    let Some(raw) = non_blank(raw) else {
        return Ok(None);
    };

    match serde_json::from_str::<Value>(raw)? {
        Value::Null => Ok(None),
        value => Ok(Some(value)),
    }
}

fn non_blank(raw: Option<&str>) -> Option<&str> {
    raw.filter(|value| !value.trim().is_empty())
}
