use std::time::Duration;

use async_graphql::http::GraphiQLSource;
use async_graphql_axum::{GraphQLRequest, GraphQLResponse};
use axum::{
    extract::State,
    middleware,
    response::{Html, IntoResponse},
    routing::get,
    Extension, Router,
};
use infra::RegistrationError;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::auth::{AuthMiddleware, Claims};
use crate::error::AppError;
use crate::gql::AppSchema;
use crate::state::AppState;

/// Build the Axum router with health endpoint and GraphQL
pub fn build_router(state: AppState, schema: AppSchema) -> Router {
    Router::new()
        // Liveness check; also proves the registration store answers.
        .route("/health", get(health))
        .route("/graphql", get(graphiql).post(graphql_handler))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            AuthMiddleware::optional_jwt_auth,
        ))
        .layer(Extension(schema))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
        .layer(CorsLayer::permissive()) // tighten later
}

async fn graphql_handler(
    Extension(schema): Extension<AppSchema>,
    claims: Option<Extension<Claims>>,
    req: GraphQLRequest,
) -> GraphQLResponse {
    let mut req = req.into_inner();
    if let Some(Extension(claims)) = claims {
        req = req.data(claims);
    }
    schema.execute(req).await.into()
}

async fn graphiql() -> impl IntoResponse {
    Html(GraphiQLSource::build().endpoint("/graphql").finish())
}

async fn health(State(state): State<AppState>) -> Result<&'static str, AppError> {
    state
        .registrations
        .store()
        .ping()
        .await
        .map_err(RegistrationError::StoreUnavailable)?;
    Ok("ok")
}
