use async_graphql::{Context, Object, Result, ID};
use infra::registration::RegistrationRequest;
use infra::RegistrationError;

use super::queries::parse_id;
use super::types::{ApprovalStatus, PaymentStatus, RegisterForGameInput, Registration};
use crate::auth::permissions::{current_actor, require_role};
use crate::auth::Role;
use crate::error::gql_error;
use crate::state::AppState;

pub struct MutationRoot;

#[Object]
impl MutationRoot {
    /// Register the caller (or, for admins, `input.userId`) for a game day.
    async fn register_for_game(
        &self,
        ctx: &Context<'_>,
        input: RegisterForGameInput,
    ) -> Result<Registration> {
        let actor = current_actor(ctx)?;
        let state = ctx.data::<AppState>()?;

        let user_id = match input.user_id {
            Some(other) if other != actor.user_id => {
                if !actor.is_admin {
                    return Err(gql_error(RegistrationError::Forbidden(
                        "only admins can register other users".into(),
                    )));
                }
                other
            }
            _ => actor.user_id.clone(),
        };

        let request = RegistrationRequest {
            user_id,
            game_id: input.game_id,
            game_name: input.game_name,
            game_day: input.game_day,
            registration_type: input.registration_type.into(),
            team_leader: input.team_leader.into(),
            team_members: input.team_members.into_iter().map(Into::into).collect(),
            total_fee_cents: input.total_fee_cents,
        };

        let row = state.registrations.register(request).await.map_err(gql_error)?;
        Ok(row.into())
    }

    async fn update_approval_status(
        &self,
        ctx: &Context<'_>,
        id: ID,
        status: ApprovalStatus,
    ) -> Result<Registration> {
        let actor = require_role(ctx, Role::Admin)?;
        let state = ctx.data::<AppState>()?;
        let row = state
            .registrations
            .set_approval_status(&actor, parse_id(&id)?, status.into())
            .await
            .map_err(gql_error)?;
        Ok(row.into())
    }

    async fn update_payment_status(
        &self,
        ctx: &Context<'_>,
        id: ID,
        status: PaymentStatus,
    ) -> Result<Registration> {
        let actor = require_role(ctx, Role::Admin)?;
        let state = ctx.data::<AppState>()?;
        let row = state
            .registrations
            .set_payment_status(&actor, parse_id(&id)?, status.into())
            .await
            .map_err(gql_error)?;
        Ok(row.into())
    }

    /// Students may delete their own unapproved registrations; admins any.
    async fn delete_registration(&self, ctx: &Context<'_>, id: ID) -> Result<bool> {
        let actor = current_actor(ctx)?;
        let state = ctx.data::<AppState>()?;
        state
            .registrations
            .delete(&actor, parse_id(&id)?)
            .await
            .map_err(gql_error)?;
        Ok(true)
    }
}
