pub mod catalog;
pub mod config;
pub mod domain;
pub mod errors;

pub use catalog::{parse_images, parse_on_sale, ProductResponse};
pub use domain::product::{Product, ProductId, DEFAULT_CURRENCY};
pub use errors::{ApplicationError, InterfaceError};
