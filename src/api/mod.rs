//! HTTP surface: routes, middleware and the OpenAPI document.

pub mod handlers {
    pub use crate::handlers::*;
}

pub mod models {
    pub use crate::api_models::*;
}

use crate::api_models::{
    ChatFailure, ChatRequest, ChatResponse, GroupedProviders, ProviderLookupRequest,
    ProviderLookupResponse,
};
use crate::handlers::{self as h, AppState};
use crate::models::{
    Budget, Bundle, ChatRole, ChatTurn, InternetUsage, Priority, Provider, ServiceType,
    UserProfile,
};
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Largest accepted request body.
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

#[derive(OpenApi)]
#[openapi(
    paths(h::health, h::chat, h::lookup_providers),
    components(schemas(
        ChatRequest,
        ChatResponse,
        ChatFailure,
        ProviderLookupRequest,
        ProviderLookupResponse,
        GroupedProviders,
        UserProfile,
        Budget,
        InternetUsage,
        Priority,
        ServiceType,
        Provider,
        Bundle,
        ChatTurn,
        ChatRole
    )),
    tags((name = "utility-advisor", description = "Utility provider chat advisor"))
)]
pub struct ApiDoc;

/// Builds the application router with all routes and layers applied.
pub fn build_router(state: Arc<AppState>) -> Router {
    let api_routes = Router::new()
        .route("/api/v1/chat", post(h::chat))
        .route("/api/v1/providers", post(h::lookup_providers))
        .layer(ServiceBuilder::new().layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES)));

    Router::new()
        .route("/health", get(h::health))
        .merge(api_routes)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_routes() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&String> = doc.paths.paths.keys().collect();
        assert!(paths.iter().any(|p| p.as_str() == "/api/v1/chat"));
        assert!(paths.iter().any(|p| p.as_str() == "/api/v1/providers"));
        assert!(paths.iter().any(|p| p.as_str() == "/health"));
    }
}
