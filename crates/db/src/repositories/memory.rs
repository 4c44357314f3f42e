use chrono::Utc;
use tokio::sync::RwLock;
use tracing::warn;

use storefront_core::domain::product::Product;

use super::{ProductRepository, RepositoryError};

/// Product store backed by a vector, ordered the same way as the SQL store
/// (`created_at`, then `slug`). Slug uniqueness is not enforced here.
#[derive(Default)]
pub struct InMemoryProductRepository {
    products: RwLock<Vec<Product>>,
}

impl InMemoryProductRepository {
    pub fn with_products(products: Vec<Product>) -> Self {
        Self { products: RwLock::new(products) }
    }

    async fn select(&self, predicate: impl Fn(&Product) -> bool) -> Vec<Product> {
        let products = self.products.read().await;
        let mut selected: Vec<Product> = products
            .iter()
            .filter(|product| product.is_visible() && predicate(product))
            .cloned()
            .collect();
        selected.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.slug.cmp(&b.slug)));
        selected
    }
}

#[async_trait::async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn list_by_category(&self, category: &str) -> Result<Vec<Product>, RepositoryError> {
        Ok(self.select(|product| product.in_category(category)).await)
    }

    async fn list_all(&self) -> Result<Vec<Product>, RepositoryError> {
        Ok(self.select(|_| true).await)
    }

    async fn get_by_slug(&self, slug: &str) -> Result<Option<Product>, RepositoryError> {
        let mut matches = self.select(|product| product.slug == slug).await;
        if matches.len() > 1 {
            warn!(
                event_name = "catalog.store.duplicate_slug",
                slug = %slug,
                count = matches.len(),
                "more than one active product shares this slug; returning the earliest created"
            );
        }

        matches.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(matches.into_iter().next())
    }

    async fn save(&self, mut product: Product) -> Result<(), RepositoryError> {
        product.updated_at = Utc::now().max(product.updated_at);

        let mut products = self.products.write().await;
        match products.iter_mut().find(|existing| existing.id == product.id) {
            Some(existing) => {
                product.created_at = existing.created_at;
                *existing = product;
            }
            None => products.push(product),
        }
        Ok(())
    }
}
