use std::sync::Arc;

use api::auth::{Claims, Role};
use api::gql::AppSchema;
use api::{AppConfig, AppState};
use async_graphql::{Request, Variables};
use infra::registration::{MemoryStore, RegistrationConfig};

pub const TEST_JWT_SECRET: &str = "test-secret";

pub fn test_config() -> AppConfig {
    AppConfig {
        database_url: "postgres://unused".to_string(),
        port: 0,
        jwt_secret: TEST_JWT_SECRET.to_string(),
        db_max_connections: 1,
        registration: RegistrationConfig::default(),
    }
}

/// AppState backed by an in-memory store; the store handle is returned for outage tests.
pub fn setup_state() -> (AppState, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let state = AppState::new(store.clone(), &test_config());
    (state, store)
}

/// Helper function to execute GraphQL queries and mutations
pub async fn execute_graphql(
    schema: &AppSchema,
    query: &str,
    variables: Option<Variables>,
    auth_claims: Option<Claims>,
) -> async_graphql::Response {
    let mut request = Request::new(query);

    if let Some(vars) = variables {
        request = request.variables(vars);
    }

    if let Some(claims) = auth_claims {
        request = request.data(claims);
    }

    schema.execute(request).await
}

#[allow(dead_code)]
pub fn student(user_id: &str) -> Claims {
    Claims::new(user_id, format!("{user_id}@example.com"), Role::Student, 1)
}

#[allow(dead_code)]
pub fn admin(user_id: &str) -> Claims {
    Claims::new(user_id, format!("{user_id}@example.com"), Role::Admin, 1)
}

/// First error code from a GraphQL response, if any.
#[allow(dead_code)]
pub fn error_code(response: &async_graphql::Response) -> Option<String> {
    let extensions = response.errors.first()?.extensions.as_ref()?;
    match extensions.get("code")? {
        async_graphql::Value::String(code) => Some(code.clone()),
        _ => None,
    }
}

#[allow(dead_code)]
pub const REGISTER_MUTATION: &str = r#"
    mutation Register($input: RegisterForGameInput!) {
        registerForGame(input: $input) {
            id
            userId
            gameName
            gameDay
            registrationId
            receiptNumber
            teamSize
            approvalStatus
            paymentStatus
            teamIds { memberId memberName memberType }
        }
    }
"#;

/// Variables for an individual registration by a Saffrony student.
#[allow(dead_code)]
pub fn individual_input(game_name: &str, game_day: u8, leader: &str) -> Variables {
    Variables::from_json(serde_json::json!({
        "input": {
            "gameId": game_name.to_lowercase().replace(' ', "-"),
            "gameName": game_name,
            "gameDay": game_day,
            "registrationType": "INDIVIDUAL",
            "teamLeader": {
                "name": leader,
                "email": "leader@example.com",
                "college": "Saffrony Institute of Technology",
                "contact": "9999999999"
            },
            "totalFeeCents": 5000
        }
    }))
}
