use crate::api::handlers::{health, research};
use crate::AppState;
use axum::{routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};

/// Upper bound for request bodies
const MAX_BODY_BYTES: usize = 64 * 1024;

/// Research routes, mounted under `/api`
pub fn create_router() -> Router<AppState> {
    Router::new()
        .route(
            "/research",
            get(research::list_research).post(research::create_research),
        )
        .route("/research/{research_id}", get(research::get_research))
        .route("/research/{research_id}/report", get(research::get_report))
}

/// Full application: health, API, OpenAPI document and middleware
pub fn build_app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let router = Router::new()
        .route("/health", get(health::health))
        .nest("/api", create_router());

    #[cfg(feature = "swagger-ui")]
    let router = {
        use utoipa::OpenApi;
        router.merge(
            utoipa_swagger_ui::SwaggerUi::new("/swagger-ui")
                .url("/api-docs/openapi.json", crate::api::ApiDoc::openapi()),
        )
    };

    #[cfg(not(feature = "swagger-ui"))]
    let router = router.route("/api-docs/openapi.json", get(crate::api::openapi_json));

    router
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
