use async_trait::async_trait;
use thiserror::Error;

use storefront_core::domain::product::Product;
use storefront_core::errors::ApplicationError;

pub mod memory;
pub mod product;

pub use memory::InMemoryProductRepository;
pub use product::SqlProductRepository;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
}

impl From<RepositoryError> for ApplicationError {
    fn from(value: RepositoryError) -> Self {
        ApplicationError::Persistence(value.to_string())
    }
}

/// Product store. Every read is restricted to active records.
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Active products whose category equals `category` ignoring case.
    /// A blank category matches nothing.
    async fn list_by_category(&self, category: &str) -> Result<Vec<Product>, RepositoryError>;

    async fn list_all(&self) -> Result<Vec<Product>, RepositoryError>;

    async fn get_by_slug(&self, slug: &str) -> Result<Option<Product>, RepositoryError>;

    /// Upserts by id. An existing record keeps its `created_at`; `updated_at`
    /// is refreshed on every save. Used by seeding and administrative tooling,
    /// never by the query path.
    async fn save(&self, product: Product) -> Result<(), RepositoryError>;
}
