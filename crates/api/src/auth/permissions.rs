use async_graphql::{Context, Result};
use infra::registration::Actor;

use crate::auth::{Claims, Role};
use crate::error::{gql_error, AppError};

/// The authenticated caller, or an `UNAUTHENTICATED` error.
pub fn current_actor(ctx: &Context<'_>) -> Result<Actor> {
    let claims = ctx
        .data::<Claims>()
        .map_err(|_| gql_error(AppError::Unauthorized("Authentication required".into())))?;
    Ok(claims.actor())
}

/// Check if the authenticated user has the required role
pub fn require_role(ctx: &Context<'_>, required_role: Role) -> Result<Actor> {
    let actor = current_actor(ctx)?;
    if !has_required_role(&actor, required_role) {
        return Err(gql_error(infra::RegistrationError::Forbidden(format!(
            "Insufficient permissions. Required role: {:?}",
            required_role
        ))));
    }
    Ok(actor)
}

fn has_required_role(actor: &Actor, required_role: Role) -> bool {
    match required_role {
        Role::Admin => actor.is_admin,
        Role::Student => true, // Everyone has student permissions
    }
}
