use std::sync::Arc;

use storefront_core::{ApplicationError, ProductResponse};
use storefront_db::ProductRepository;

/// Read-side catalog queries shared by every request handler.
#[derive(Clone)]
pub struct CatalogService {
    products: Arc<dyn ProductRepository>,
}

impl CatalogService {
    pub fn new(products: Arc<dyn ProductRepository>) -> Self {
        Self { products }
    }

    /// Active products, optionally narrowed to one category. A blank
    /// category is treated as no filter.
    pub async fn list_products(
        &self,
        category: Option<&str>,
    ) -> Result<Vec<ProductResponse>, ApplicationError> {
        let products = match category.map(str::trim).filter(|category| !category.is_empty()) {
            Some(category) => self.products.list_by_category(category).await?,
            None => self.products.list_all().await?,
        };

        Ok(products.iter().map(ProductResponse::from).collect())
    }

    pub async fn product_by_slug(&self, slug: &str) -> Result<ProductResponse, ApplicationError> {
        self.products
            .get_by_slug(slug)
            .await?
            .map(ProductResponse::from)
            .ok_or_else(|| ApplicationError::NotFound(format!("no active product with slug `{slug}`")))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{Duration, Utc};
    use storefront_core::{ApplicationError, Product};
    use storefront_db::{connect_with_settings, InMemoryProductRepository, SqlProductRepository};

    use super::CatalogService;

    fn product(slug: &str, category: Option<&str>, active: bool, age_minutes: i64) -> Product {
        let mut product = Product::new(slug, slug.replace('-', " "), 1_000);
        product.category = category.map(str::to_owned);
        product.is_active = active;
        product.created_at = Utc::now() - Duration::minutes(age_minutes);
        product.updated_at = product.created_at;
        product
    }

    fn service(products: Vec<Product>) -> CatalogService {
        CatalogService::new(Arc::new(InMemoryProductRepository::with_products(products)))
    }

    #[tokio::test]
    async fn blank_or_missing_category_lists_every_active_product() {
        let service = service(vec![
            product("ramadan-lantern", Some("Ramadan Decor"), true, 30),
            product("kids-name-sign", Some("Kids"), true, 20),
            product("retired-eid-banner", Some("Ramadan Decor"), false, 10),
        ]);

        for category in [None, Some(""), Some("   ")] {
            let listed = service.list_products(category).await.expect("list");
            let slugs: Vec<&str> = listed.iter().map(|product| product.slug.as_str()).collect();
            assert_eq!(slugs, vec!["ramadan-lantern", "kids-name-sign"], "category {category:?}");
        }
    }

    #[tokio::test]
    async fn category_filter_is_trimmed_and_case_insensitive() {
        let service = service(vec![
            product("ramadan-lantern", Some("Ramadan Decor"), true, 30),
            product("kids-name-sign", Some("Kids"), true, 20),
        ]);

        let listed = service.list_products(Some("  ramadan decor ")).await.expect("list");
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].slug, "ramadan-lantern");

        let none = service.list_products(Some("Garden")).await.expect("list");
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn unknown_and_inactive_slugs_are_not_found() {
        let service = service(vec![
            product("ramadan-lantern", Some("Ramadan Decor"), true, 30),
            product("retired-eid-banner", Some("Ramadan Decor"), false, 10),
        ]);

        let found = service.product_by_slug("ramadan-lantern").await.expect("found");
        assert_eq!(found.slug, "ramadan-lantern");

        for slug in ["unknown-slug", "retired-eid-banner", "RAMADAN-LANTERN"] {
            let error = service.product_by_slug(slug).await.expect_err("should be missing");
            assert!(matches!(error, ApplicationError::NotFound(_)), "{slug}: {error:?}");
        }
    }

    #[tokio::test]
    async fn storage_failures_surface_as_persistence_errors() {
        let pool = connect_with_settings("sqlite::memory:", 1, 1).await.expect("connect");
        pool.close().await;
        let service = CatalogService::new(Arc::new(SqlProductRepository::new(pool)));

        let error = service.list_products(None).await.expect_err("closed pool");
        assert!(matches!(error, ApplicationError::Persistence(_)));

        let error = service.product_by_slug("ramadan-lantern").await.expect_err("closed pool");
        assert!(matches!(error, ApplicationError::Persistence(_)));
    }
}
