use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use tracing::debug;

use crate::state::AppState;

pub struct AuthMiddleware;

impl AuthMiddleware {
    /// Attaches claims when a valid bearer token is present; anonymous requests pass through.
    pub async fn optional_jwt_auth(
        State(state): State<AppState>,
        mut request: Request,
        next: Next,
    ) -> Response {
        let jwt_service = state.jwt_service();

        if let Some(token) = request
            .headers()
            .get(AUTHORIZATION)
            .and_then(|header| header.to_str().ok())
            .and_then(|header| header.strip_prefix("Bearer "))
        {
            match jwt_service.verify_token(token) {
                Ok(claims) => {
                    request.extensions_mut().insert(claims);
                }
                Err(e) => debug!(error = %e, "ignoring invalid bearer token"),
            }
        }

        next.run(request).await
    }
}
