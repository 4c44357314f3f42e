use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use storefront_core::{ApplicationError, InterfaceError, ProductResponse};
use tracing::{error, info};
use uuid::Uuid;

use crate::service::CatalogService;

#[derive(Clone)]
pub struct CatalogState {
    service: CatalogService,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct ListProductsQuery {
    pub category: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub error: String,
    pub correlation_id: String,
}

/// Interface error rendered as a JSON body with the matching status code.
#[derive(Debug)]
pub struct ApiError(InterfaceError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = ErrorBody {
            error: self.0.user_message().to_string(),
            correlation_id: self.0.correlation_id().to_string(),
        };
        (status, Json(body)).into_response()
    }
}

pub fn router(service: CatalogService) -> Router {
    Router::new()
        .route("/api/products", get(list_products))
        .route("/api/products/{slug}", get(product_by_slug))
        .with_state(CatalogState { service })
}

async fn list_products(
    State(state): State<CatalogState>,
    Query(query): Query<ListProductsQuery>,
) -> Result<Json<Vec<ProductResponse>>, ApiError> {
    let correlation_id = Uuid::new_v4().to_string();
    let category = query.category.as_deref();

    match state.service.list_products(category).await {
        Ok(products) => {
            info!(
                event_name = "catalog.products.listed",
                correlation_id = %correlation_id,
                category = category.unwrap_or(""),
                count = products.len(),
                "listed catalog products"
            );
            Ok(Json(products))
        }
        Err(failure) => Err(reject(failure, &correlation_id)),
    }
}

async fn product_by_slug(
    State(state): State<CatalogState>,
    Path(slug): Path<String>,
) -> Result<Json<ProductResponse>, ApiError> {
    let correlation_id = Uuid::new_v4().to_string();

    match state.service.product_by_slug(&slug).await {
        Ok(product) => {
            info!(
                event_name = "catalog.product.fetched",
                correlation_id = %correlation_id,
                slug = %slug,
                "fetched catalog product"
            );
            Ok(Json(product))
        }
        Err(failure) => Err(reject(failure, &correlation_id)),
    }
}

fn reject(failure: ApplicationError, correlation_id: &str) -> ApiError {
    match &failure {
        ApplicationError::NotFound(detail) => info!(
            event_name = "catalog.product.not_found",
            correlation_id = %correlation_id,
            detail = %detail,
            "catalog lookup missed"
        ),
        ApplicationError::Persistence(detail) => error!(
            event_name = "catalog.request.failed",
            correlation_id = %correlation_id,
            error = %detail,
            "catalog request failed"
        ),
    }

    ApiError(failure.into_interface(correlation_id))
}
