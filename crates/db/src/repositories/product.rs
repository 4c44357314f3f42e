use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::Row;
use tracing::warn;
use uuid::Uuid;

use storefront_core::domain::product::{Product, ProductId};

use super::{ProductRepository, RepositoryError};
use crate::DbPool;

pub struct SqlProductRepository {
    pool: DbPool,
}

fn decode_error(error: impl std::fmt::Display) -> RepositoryError {
    RepositoryError::Decode(error.to_string())
}

fn parse_timestamp(column: &str, value: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::Decode(format!("{column}: {e}")))
}

/// NULL or blank text reads as no tags.
fn decode_tags(raw: Option<&str>) -> Result<Vec<String>, RepositoryError> {
    match raw.filter(|value| !value.trim().is_empty()) {
        None => Ok(Vec::new()),
        Some(raw) => serde_json::from_str(raw)
            .map_err(|e| RepositoryError::Decode(format!("tags: {e}"))),
    }
}

fn row_to_product(row: &sqlx::sqlite::SqliteRow) -> Result<Product, RepositoryError> {
    let id: String = row.try_get("id").map_err(decode_error)?;
    let tags_json: Option<String> = row.try_get("tags").map_err(decode_error)?;
    let created_at_str: String = row.try_get("created_at").map_err(decode_error)?;
    let updated_at_str: String = row.try_get("updated_at").map_err(decode_error)?;

    let id = Uuid::parse_str(&id).map_err(|e| RepositoryError::Decode(format!("id: {e}")))?;
    let tags = decode_tags(tags_json.as_deref())?;

    Ok(Product {
        id: ProductId(id),
        slug: row.try_get("slug").map_err(decode_error)?,
        name: row.try_get("name").map_err(decode_error)?,
        description: row.try_get("description").map_err(decode_error)?,
        long_description: row.try_get("long_description").map_err(decode_error)?,
        category: row.try_get("category").map_err(decode_error)?,
        price_cents: row.try_get("price_cents").map_err(decode_error)?,
        currency: row.try_get("currency").map_err(decode_error)?,
        images: row.try_get("images").map_err(decode_error)?,
        material: row.try_get("material").map_err(decode_error)?,
        is_active: row.try_get("is_active").map_err(decode_error)?,
        is_featured: row.try_get("is_featured").map_err(decode_error)?,
        stock_qty: row.try_get("stock_qty").map_err(decode_error)?,
        is_customizable: row.try_get("is_customizable").map_err(decode_error)?,
        tags,
        on_sale: row.try_get("on_sale").map_err(decode_error)?,
        created_at: parse_timestamp("created_at", &created_at_str)?,
        updated_at: parse_timestamp("updated_at", &updated_at_str)?,
    })
}

impl SqlProductRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Every active row in listing order. Rows that fail to decode are left
    /// out of the result and logged so one bad record cannot empty a listing.
    async fn active_products(&self) -> Result<Vec<Product>, RepositoryError> {
        let rows: Vec<sqlx::sqlite::SqliteRow> = sqlx::query(
            "SELECT id, slug, name, description, long_description, category, price_cents,
                    currency, images, material, is_active, is_featured, stock_qty,
                    is_customizable, tags, on_sale, created_at, updated_at
             FROM products
             WHERE is_active = 1
             ORDER BY created_at ASC, slug ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        let products = rows
            .iter()
            .filter_map(|row| match row_to_product(row) {
                Ok(product) => Some(product),
                Err(error) => {
                    let id: String = row.try_get("id").unwrap_or_default();
                    warn!(
                        event_name = "catalog.store.row_skipped",
                        product_id = %id,
                        error = %error,
                        "undecodable product row left out of listing"
                    );
                    None
                }
            })
            .collect();

        Ok(products)
    }
}

#[async_trait::async_trait]
impl ProductRepository for SqlProductRepository {
    async fn list_by_category(&self, category: &str) -> Result<Vec<Product>, RepositoryError> {
        if category.is_empty() {
            return Ok(Vec::new());
        }

        // SQLite's lower() folds ASCII only, so matching happens here.
        let mut products = self.active_products().await?;
        products.retain(|product| product.in_category(category));
        Ok(products)
    }

    async fn list_all(&self) -> Result<Vec<Product>, RepositoryError> {
        self.active_products().await
    }

    async fn get_by_slug(&self, slug: &str) -> Result<Option<Product>, RepositoryError> {
        // LIMIT 2 is enough to notice a uniqueness violation.
        let rows: Vec<sqlx::sqlite::SqliteRow> = sqlx::query(
            "SELECT id, slug, name, description, long_description, category, price_cents,
                    currency, images, material, is_active, is_featured, stock_qty,
                    is_customizable, tags, on_sale, created_at, updated_at
             FROM products
             WHERE is_active = 1 AND slug = ?
             ORDER BY created_at ASC, id ASC
             LIMIT 2",
        )
        .bind(slug)
        .fetch_all(&self.pool)
        .await?;

        if rows.len() > 1 {
            warn!(
                event_name = "catalog.store.duplicate_slug",
                slug = %slug,
                "more than one active product shares this slug; returning the earliest created"
            );
        }

        rows.first().map(row_to_product).transpose()
    }

    async fn save(&self, product: Product) -> Result<(), RepositoryError> {
        let tags_json = serde_json::to_string(&product.tags).map_err(decode_error)?;
        let updated_at = Utc::now().max(product.updated_at);

        sqlx::query(
            "INSERT INTO products (id, slug, name, description, long_description, category,
                                   price_cents, currency, images, material, is_active,
                                   is_featured, stock_qty, is_customizable, tags, on_sale,
                                   created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET
                 slug = excluded.slug,
                 name = excluded.name,
                 description = excluded.description,
                 long_description = excluded.long_description,
                 category = excluded.category,
                 price_cents = excluded.price_cents,
                 currency = excluded.currency,
                 images = excluded.images,
                 material = excluded.material,
                 is_active = excluded.is_active,
                 is_featured = excluded.is_featured,
                 stock_qty = excluded.stock_qty,
                 is_customizable = excluded.is_customizable,
                 tags = excluded.tags,
                 on_sale = excluded.on_sale,
                 updated_at = excluded.updated_at",
        )
        .bind(product.id.0.to_string())
        .bind(&product.slug)
        .bind(&product.name)
        .bind(&product.description)
        .bind(&product.long_description)
        .bind(&product.category)
        .bind(product.price_cents)
        .bind(&product.currency)
        .bind(&product.images)
        .bind(&product.material)
        .bind(product.is_active)
        .bind(product.is_featured)
        .bind(product.stock_qty)
        .bind(product.is_customizable)
        .bind(&tags_json)
        .bind(&product.on_sale)
        .bind(product.created_at.to_rfc3339_opts(SecondsFormat::Micros, true))
        .bind(updated_at.to_rfc3339_opts(SecondsFormat::Micros, true))
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use storefront_core::domain::product::Product;

    use super::SqlProductRepository;
    use crate::repositories::{ProductRepository, RepositoryError};
    use crate::{connect_with_settings, migrations};

    async fn setup() -> sqlx::SqlitePool {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("migrations");
        pool
    }

    fn sample(slug: &str, category: &str, minutes_ago: i64) -> Product {
        let mut product = Product::new(slug, slug.replace('-', " "), 2500);
        product.category = Some(category.to_string());
        product.created_at = Utc::now() - Duration::minutes(minutes_ago);
        product.updated_at = product.created_at;
        product
    }

    #[tokio::test]
    async fn list_all_returns_only_active_products_once() {
        let pool = setup().await;
        let repo = SqlProductRepository::new(pool);

        repo.save(sample("ramadan-lantern", "Ramadan Decor", 30)).await.expect("save");
        repo.save(sample("kids-name-sign", "Kids", 20)).await.expect("save");
        let mut retired = sample("retired-sign", "Signs", 10);
        retired.is_active = false;
        repo.save(retired).await.expect("save");

        let products = repo.list_all().await.expect("list");
        let slugs: Vec<&str> = products.iter().map(|p| p.slug.as_str()).collect();

        assert_eq!(slugs, vec!["ramadan-lantern", "kids-name-sign"]);
    }

    #[tokio::test]
    async fn list_by_category_ignores_case_and_skips_inactive() {
        let pool = setup().await;
        let repo = SqlProductRepository::new(pool);

        repo.save(sample("ramadan-lantern", "Ramadan Decor", 30)).await.expect("save");
        repo.save(sample("crescent-garland", "RAMADAN DECOR", 20)).await.expect("save");
        let mut hidden = sample("old-lantern", "Ramadan Decor", 10);
        hidden.is_active = false;
        repo.save(hidden).await.expect("save");
        repo.save(sample("kids-name-sign", "Kids", 5)).await.expect("save");

        let products = repo.list_by_category("ramadan decor").await.expect("list");
        let slugs: Vec<&str> = products.iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(slugs, vec!["ramadan-lantern", "crescent-garland"]);

        assert!(repo.list_by_category("Garden").await.expect("list").is_empty());
        assert!(repo.list_by_category("").await.expect("list").is_empty());
    }

    #[tokio::test]
    async fn get_by_slug_hides_inactive_products() {
        let pool = setup().await;
        let repo = SqlProductRepository::new(pool);

        let active = sample("ramadan-lantern", "Ramadan Decor", 10);
        repo.save(active.clone()).await.expect("save");
        let mut inactive = sample("retired-sign", "Signs", 5);
        inactive.is_active = false;
        repo.save(inactive).await.expect("save");

        let found = repo.get_by_slug("ramadan-lantern").await.expect("find");
        assert_eq!(found.map(|p| p.id), Some(active.id));
        assert!(repo.get_by_slug("retired-sign").await.expect("find").is_none());
        assert!(repo.get_by_slug("unknown-slug").await.expect("find").is_none());
        assert!(repo.get_by_slug("RAMADAN-LANTERN").await.expect("find").is_none());
    }

    #[tokio::test]
    async fn stored_fields_round_trip_through_the_row_mapping() {
        let pool = setup().await;
        let repo = SqlProductRepository::new(pool);

        let mut product = sample("ramadan-lantern", "Ramadan Decor", 1);
        product.description = Some("Decorative lantern for Ramadan".to_string());
        product.long_description = Some("Hand-finished metal lantern.".to_string());
        product.images = Some(r#"["/assets/ramadan1.jpg"]"#.to_string());
        product.material = Some("metal".to_string());
        product.is_featured = true;
        product.stock_qty = Some(3_000_000_000);
        product.is_customizable = true;
        product.tags = vec!["ramadan".to_string(), "lantern".to_string()];
        product.on_sale = Some(r#"{"enabled":true,"percent":15}"#.to_string());
        repo.save(product.clone()).await.expect("save");

        let found = repo.get_by_slug("ramadan-lantern").await.expect("find").expect("present");

        assert_eq!(found.id, product.id);
        assert_eq!(found.description, product.description);
        assert_eq!(found.long_description, product.long_description);
        assert_eq!(found.images, product.images);
        assert_eq!(found.material, product.material);
        assert!(found.is_featured);
        assert_eq!(found.stock_qty, Some(3_000_000_000));
        assert!(found.is_customizable);
        assert_eq!(found.tags, product.tags);
        assert_eq!(found.on_sale, product.on_sale);
        assert_eq!(found.currency, "CAD");
        assert_eq!(found.created_at.timestamp_micros(), product.created_at.timestamp_micros());
    }

    #[tokio::test]
    async fn save_keeps_identity_and_creation_time() {
        let pool = setup().await;
        let repo = SqlProductRepository::new(pool);

        let original = sample("ramadan-lantern", "Ramadan Decor", 60);
        repo.save(original.clone()).await.expect("save");

        let mut edited = original.clone();
        edited.price_cents = 2999;
        edited.created_at = Utc::now();
        repo.save(edited).await.expect("update");

        let found = repo.get_by_slug("ramadan-lantern").await.expect("find").expect("present");
        assert_eq!(found.id, original.id);
        assert_eq!(found.price_cents, 2999);
        assert_eq!(found.created_at.timestamp_micros(), original.created_at.timestamp_micros());
        assert!(found.updated_at > original.updated_at);
    }

    #[tokio::test]
    async fn schema_rejects_duplicate_slugs() {
        let pool = setup().await;
        let repo = SqlProductRepository::new(pool);

        repo.save(sample("ramadan-lantern", "Ramadan Decor", 10)).await.expect("save");
        let result = repo.save(sample("ramadan-lantern", "Ramadan Decor", 5)).await;

        assert!(matches!(result, Err(RepositoryError::Database(_))));
    }

    #[tokio::test]
    async fn schema_rejects_negative_prices() {
        let pool = setup().await;
        let repo = SqlProductRepository::new(pool);

        let mut product = sample("broken-price", "Signs", 1);
        product.price_cents = -1;

        assert!(matches!(repo.save(product).await, Err(RepositoryError::Database(_))));
    }

    async fn insert_raw(
        pool: &sqlx::SqlitePool,
        id: &str,
        slug: &str,
        tags: Option<&str>,
        created_at: &str,
    ) {
        sqlx::query(
            "INSERT INTO products (id, slug, name, price_cents, tags, created_at, updated_at)
             VALUES (?, ?, ?, 100, ?, ?, ?)",
        )
        .bind(id)
        .bind(slug)
        .bind(slug)
        .bind(tags)
        .bind(created_at)
        .bind(created_at)
        .execute(pool)
        .await
        .expect("insert raw row");
    }

    #[tokio::test]
    async fn empty_or_null_tags_read_as_no_tags() {
        let pool = setup().await;
        insert_raw(
            &pool,
            "6f1c1d7e-0000-4000-8000-000000000001",
            "blank-tags",
            Some(""),
            "2026-01-01T00:00:00.000000Z",
        )
        .await;
        insert_raw(
            &pool,
            "6f1c1d7e-0000-4000-8000-000000000002",
            "null-tags",
            None,
            "2026-01-02T00:00:00.000000Z",
        )
        .await;
        let repo = SqlProductRepository::new(pool);

        let products = repo.list_all().await.expect("list");
        let slugs: Vec<&str> = products.iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(slugs, vec!["blank-tags", "null-tags"]);
        assert!(products.iter().all(|p| p.tags.is_empty()));

        let found = repo.get_by_slug("blank-tags").await.expect("find").expect("present");
        assert!(found.tags.is_empty());
    }

    #[tokio::test]
    async fn undecodable_rows_are_left_out_of_listings() {
        let pool = setup().await;
        insert_raw(
            &pool,
            "6f1c1d7e-0000-4000-8000-000000000001",
            "good-first",
            Some(r#"["a"]"#),
            "2026-01-01T00:00:00.000000Z",
        )
        .await;
        insert_raw(
            &pool,
            "6f1c1d7e-0000-4000-8000-000000000002",
            "bad-tags",
            Some("not-json"),
            "2026-01-02T00:00:00.000000Z",
        )
        .await;
        insert_raw(
            &pool,
            "6f1c1d7e-0000-4000-8000-000000000003",
            "bad-timestamp",
            None,
            "yesterday",
        )
        .await;
        insert_raw(
            &pool,
            "6f1c1d7e-0000-4000-8000-000000000004",
            "good-last",
            None,
            "2026-01-04T00:00:00.000000Z",
        )
        .await;
        let repo = SqlProductRepository::new(pool);

        let products = repo.list_all().await.expect("list");
        let slugs: Vec<&str> = products.iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(slugs, vec!["good-first", "good-last"]);

        let result = repo.get_by_slug("bad-tags").await;
        assert!(matches!(result, Err(RepositoryError::Decode(ref message)) if message.contains("tags")));
    }

    #[tokio::test]
    async fn category_match_folds_non_ascii_case() {
        let pool = setup().await;
        let repo = SqlProductRepository::new(pool);

        repo.save(sample("summer-wreath", "Décor Été", 10)).await.expect("save");
        repo.save(sample("ramadan-lantern", "Ramadan Decor", 5)).await.expect("save");

        for query in ["Décor Été", "DÉCOR ÉTÉ", "décor été"] {
            let products = repo.list_by_category(query).await.expect("list");
            let slugs: Vec<&str> = products.iter().map(|p| p.slug.as_str()).collect();
            assert_eq!(slugs, vec!["summer-wreath"], "query {query}");
        }
    }

    #[tokio::test]
    async fn closed_pool_surfaces_database_error() {
        let pool = setup().await;
        pool.close().await;
        let repo = SqlProductRepository::new(pool);

        assert!(matches!(repo.list_all().await, Err(RepositoryError::Database(_))));
    }
}
