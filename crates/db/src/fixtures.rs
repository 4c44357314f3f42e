use sqlx::Executor;

use crate::connection::DbPool;
use crate::repositories::RepositoryError;

/// Slugs the demo catalog seeds, with whether each one should be visible.
const DEMO_PRODUCTS: &[DemoProductContract] = &[
    DemoProductContract {
        slug: "ramadan-lantern",
        category: "Ramadan Decor",
        active: true,
        description: "featured lantern on sale",
    },
    DemoProductContract {
        slug: "crescent-moon-garland",
        category: "Ramadan Decor",
        active: true,
        description: "legacy images column holding a bare path",
    },
    DemoProductContract {
        slug: "kids-name-sign",
        category: "Kids",
        active: true,
        description: "customizable sign with untracked stock",
    },
    DemoProductContract {
        slug: "montessori-busy-board",
        category: "Kids",
        active: true,
        description: "malformed sale configuration",
    },
    DemoProductContract {
        slug: "welcome-home-sign",
        category: "Signs",
        active: true,
        description: "no images, no tags",
    },
    DemoProductContract {
        slug: "retired-eid-banner",
        category: "Ramadan Decor",
        active: false,
        description: "soft-deleted product",
    },
];

struct DemoProductContract {
    slug: &'static str,
    category: &'static str,
    active: bool,
    description: &'static str,
}

/// Sample storefront catalog for local runs and tests.
pub struct DemoCatalog;

impl DemoCatalog {
    pub const SQL: &str = include_str!("../../../config/fixtures/demo_catalog.sql");

    pub async fn load(pool: &DbPool) -> Result<SeedResult, RepositoryError> {
        let mut tx = pool.begin().await?;

        tx.execute(sqlx::query(Self::SQL)).await?;
        tx.commit().await?;

        let products_seeded = DEMO_PRODUCTS
            .iter()
            .map(|product| ProductSeedInfo {
                slug: product.slug,
                category: product.category,
                active: product.active,
                description: product.description,
            })
            .collect::<Vec<_>>();

        Ok(SeedResult { products_seeded })
    }

    pub async fn verify(pool: &DbPool) -> Result<VerificationResult, RepositoryError> {
        let mut checks = Vec::with_capacity(DEMO_PRODUCTS.len());

        for product in DEMO_PRODUCTS {
            let present: i64 = sqlx::query_scalar(
                "SELECT EXISTS(SELECT 1 FROM products WHERE slug = ?1 AND category = ?2 AND is_active = ?3)",
            )
            .bind(product.slug)
            .bind(product.category)
            .bind(product.active)
            .fetch_one(pool)
            .await?;
            checks.push((product.slug, present == 1));
        }

        let all_present = checks.iter().all(|(_, exists)| *exists);
        Ok(VerificationResult { all_present, checks })
    }
}

#[derive(Debug)]
pub struct SeedResult {
    pub products_seeded: Vec<ProductSeedInfo>,
}

#[derive(Debug)]
pub struct ProductSeedInfo {
    pub slug: &'static str,
    pub category: &'static str,
    pub active: bool,
    pub description: &'static str,
}

#[derive(Debug)]
pub struct VerificationResult {
    pub all_present: bool,
    pub checks: Vec<(&'static str, bool)>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::{ProductRepository, SqlProductRepository};
    use crate::{connect_with_settings, migrations};

    async fn setup() -> DbPool {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("run migrations");
        pool
    }

    #[test]
    fn sql_fixture_is_valid() {
        assert!(!DemoCatalog::SQL.is_empty());
        for product in DEMO_PRODUCTS {
            assert!(DemoCatalog::SQL.contains(product.slug), "{} missing from SQL", product.slug);
        }
    }

    #[tokio::test]
    async fn verify_seed_contract_and_idempotency() {
        let pool = setup().await;

        let first = DemoCatalog::load(&pool).await.expect("load demo catalog");
        let first_verification = DemoCatalog::verify(&pool).await.expect("verify demo catalog");
        assert!(first_verification.all_present, "{:?}", first_verification.checks);
        assert_eq!(first.products_seeded.len(), DEMO_PRODUCTS.len());

        DemoCatalog::load(&pool).await.expect("reload demo catalog");
        let second_verification = DemoCatalog::verify(&pool).await.expect("re-verify");
        assert_eq!(first_verification.checks, second_verification.checks);

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&pool)
            .await
            .expect("count products");
        assert_eq!(total, DEMO_PRODUCTS.len() as i64);
    }

    #[tokio::test]
    async fn seeded_rows_decode_through_the_repository() {
        let pool = setup().await;
        DemoCatalog::load(&pool).await.expect("load demo catalog");
        let repo = SqlProductRepository::new(pool);

        let visible = repo.list_all().await.expect("list");
        let expected_visible = DEMO_PRODUCTS.iter().filter(|product| product.active).count();
        assert_eq!(visible.len(), expected_visible);
        assert!(visible.iter().all(|product| product.slug != "retired-eid-banner"));

        let lantern = repo.get_by_slug("ramadan-lantern").await.expect("find").expect("seeded");
        assert_eq!(lantern.price_cents, 3499);
        assert_eq!(lantern.stock_qty, Some(10));
        assert_eq!(lantern.tags, vec!["ramadan", "lantern", "gift"]);
    }
}
