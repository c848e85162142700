use async_graphql::{Context, Object, Result, ID};
use chrono::{DateTime, Utc};
use infra::pagination::LimitOffset;

use super::types::{AdmissionDecision, Registration, RegistrationFilterInput};
use crate::auth::permissions::{current_actor, require_role};
use crate::auth::Role;
use crate::error::{gql_error, AppError};
use crate::state::AppState;

pub struct QueryRoot;

#[Object]
impl QueryRoot {
    /// Current server time (UTC).
    async fn server_time(&self) -> DateTime<Utc> {
        Utc::now()
    }

    /// Whether the caller could register for the given day right now.
    async fn admission_check(&self, ctx: &Context<'_>, game_day: u8) -> Result<AdmissionDecision> {
        let actor = current_actor(ctx)?;
        let state = ctx.data::<AppState>()?;
        let admission = state
            .registrations
            .check(&actor.user_id, game_day)
            .await
            .map_err(gql_error)?;
        Ok(admission.into())
    }

    async fn my_registrations(&self, ctx: &Context<'_>) -> Result<Vec<Registration>> {
        let actor = current_actor(ctx)?;
        let state = ctx.data::<AppState>()?;
        let rows = state
            .registrations
            .my_registrations(&actor.user_id)
            .await
            .map_err(gql_error)?;
        Ok(rows.into_iter().map(Registration::from).collect())
    }

    async fn registration(&self, ctx: &Context<'_>, id: ID) -> Result<Registration> {
        let actor = current_actor(ctx)?;
        let state = ctx.data::<AppState>()?;
        let row = state
            .registrations
            .get(&actor, parse_id(&id)?)
            .await
            .map_err(gql_error)?;
        Ok(row.into())
    }

    /// Admin listing with optional filters.
    async fn registrations(
        &self,
        ctx: &Context<'_>,
        filter: Option<RegistrationFilterInput>,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<Registration>> {
        let actor = require_role(ctx, Role::Admin)?;
        let state = ctx.data::<AppState>()?;
        let rows = state
            .registrations
            .list(
                &actor,
                filter.unwrap_or_default().into(),
                LimitOffset::clamped(limit, offset),
            )
            .await
            .map_err(gql_error)?;
        Ok(rows.into_iter().map(Registration::from).collect())
    }
}

pub(crate) fn parse_id(id: &ID) -> Result<uuid::Uuid> {
    uuid::Uuid::parse_str(id.as_str())
        .map_err(|e| gql_error(AppError::BadRequest(format!("Invalid registration ID: {}", e))))
}
