mod common;

use api::app::build_router;
use api::auth::Claims;
use api::gql::build_schema;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use common::*;
use jsonwebtoken::{encode, EncodingKey, Header};
use tower::ServiceExt;

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("json body")
}

fn graphql_post(query: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/graphql")
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder
        .body(Body::from(serde_json::json!({ "query": query }).to_string()))
        .unwrap()
}

fn token_for(claims: &Claims, secret: &str) -> String {
    encode(&Header::default(), claims, &EncodingKey::from_secret(secret.as_bytes())).unwrap()
}

#[tokio::test]
async fn test_server_time_query() {
    let (state, _) = setup_state();
    let schema = build_schema(state);

    let response = execute_graphql(&schema, "query { serverTime }", None, None).await;

    assert!(response.errors.is_empty(), "Server time query should succeed: {:?}", response.errors);
    let data = response.data.into_json().unwrap();
    assert!(data["serverTime"].is_string(), "Server time should be a string");
}

#[tokio::test]
async fn test_invalid_query() {
    let (state, _) = setup_state();
    let schema = build_schema(state);

    let response = execute_graphql(&schema, "query { nonExistentField }", None, None).await;

    assert!(!response.errors.is_empty(), "Invalid query should return errors");
    assert!(response.errors[0].message.contains("nonExistentField"));
}

#[tokio::test]
async fn test_health_endpoint() {
    let (state, store) = setup_state();
    let schema = build_schema(state.clone());
    let app = build_router(state, schema);

    let ok = app
        .clone()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(ok.status(), StatusCode::OK);

    store.set_unavailable(true);
    let down = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(down.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body_json(down).await["code"], "STORE_UNAVAILABLE");
}

#[tokio::test]
async fn test_bearer_token_reaches_resolvers() {
    let (state, _) = setup_state();
    let schema = build_schema(state.clone());
    let app = build_router(state, schema);
    let query = "query { myRegistrations { id } }";

    let token = token_for(&student("http-student"), TEST_JWT_SECRET);
    let response = app.clone().oneshot(graphql_post(query, Some(&token))).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert!(body.get("errors").is_none(), "unexpected errors: {body}");
    assert!(body["data"]["myRegistrations"].as_array().unwrap().is_empty());

    // a token signed with another secret is ignored, so the caller is anonymous
    let forged = token_for(&student("http-student"), "wrong-secret");
    let response = app.clone().oneshot(graphql_post(query, Some(&forged))).await.unwrap();
    let body = body_json(response).await;
    assert_eq!(body["errors"][0]["extensions"]["code"], "UNAUTHENTICATED");

    let response = app.oneshot(graphql_post(query, None)).await.unwrap();
    let body = body_json(response).await;
    assert_eq!(body["errors"][0]["extensions"]["code"], "UNAUTHENTICATED");
}
