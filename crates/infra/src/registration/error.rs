use std::fmt;
use std::time::Duration;

use thiserror::Error;
use uuid::Uuid;

use crate::models::GameDay;

/// Uniqueness constraint enforced by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueKey {
    /// `(user_id, game_day)`
    UserDay,
    RegistrationId,
    ReceiptNumber,
}

impl UniqueKey {
    /// Maps a Postgres constraint name from the registrations migration.
    pub fn from_constraint(name: &str) -> Option<Self> {
        match name {
            "registrations_user_day_key" => Some(UniqueKey::UserDay),
            "registrations_registration_id_key" => Some(UniqueKey::RegistrationId),
            "registrations_receipt_number_key" => Some(UniqueKey::ReceiptNumber),
            _ => None,
        }
    }
}

impl fmt::Display for UniqueKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UniqueKey::UserDay => f.write_str("(user_id, game_day)"),
            UniqueKey::RegistrationId => f.write_str("registration_id"),
            UniqueKey::ReceiptNumber => f.write_str("receipt_number"),
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("duplicate key on {0}")]
    Duplicate(UniqueKey),

    #[error("store operation timed out after {0:?}")]
    Timeout(Duration),

    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("database error")]
    Db(#[from] sqlx::Error),
}

/// Why an admission check refused a registration attempt.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DenyReason {
    #[error("already registered for {day} in \"{game_name}\" (registration {registration_id})")]
    DayAlreadyUsed {
        day: GameDay,
        game_name: String,
        registration_id: String,
    },

    #[error("registration limit reached, already registered for {}", describe_existing(.existing))]
    GlobalCapReached { existing: Vec<(String, GameDay)> },
}

fn describe_existing(existing: &[(String, GameDay)]) -> String {
    existing
        .iter()
        .map(|(game, day)| format!("\"{game}\" ({day})"))
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Debug, Error)]
pub enum RegistrationError {
    #[error("invalid game day {0}, expected 1 or 2")]
    InvalidDay(u8),

    #[error("user id is required")]
    InvalidUser,

    #[error("invalid registration: {0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Denied(#[from] DenyReason),

    #[error("admission check failed: {0}")]
    AdmissionCheckFailed(#[source] StoreError),

    #[error("id assignment failed: {0}")]
    AssignmentFailed(#[source] StoreError),

    #[error("registration id {0} is already taken")]
    DuplicateRegistrationId(String),

    #[error("receipt number {0} is already taken")]
    DuplicateReceiptNumber(String),

    #[error("store unavailable: {0}")]
    StoreUnavailable(#[source] StoreError),

    #[error("registration {0} not found")]
    NotFound(Uuid),

    #[error("forbidden: {0}")]
    Forbidden(String),
}

impl RegistrationError {
    /// Transient failures after which nothing was committed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            RegistrationError::AdmissionCheckFailed(_)
                | RegistrationError::AssignmentFailed(_)
                | RegistrationError::StoreUnavailable(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deny_messages_name_games() {
        let reason = DenyReason::DayAlreadyUsed {
            day: GameDay::Day1,
            game_name: "Algo Cricket".into(),
            registration_id: "SAF-ACR-1-1 [Alice]".into(),
        };
        let msg = reason.to_string();
        assert!(msg.contains("Algo Cricket"));
        assert!(msg.contains("SAF-ACR-1-1 [Alice]"));

        let reason = DenyReason::GlobalCapReached {
            existing: vec![("Algo Cricket".into(), GameDay::Day1), ("Chess".into(), GameDay::Day2)],
        };
        assert_eq!(
            reason.to_string(),
            "registration limit reached, already registered for \"Algo Cricket\" (day1), \"Chess\" (day2)"
        );
    }

    #[test]
    fn test_retryable_classification() {
        assert!(RegistrationError::AdmissionCheckFailed(StoreError::Unavailable("down".into())).is_retryable());
        assert!(!RegistrationError::InvalidDay(3).is_retryable());
        assert!(!RegistrationError::DuplicateRegistrationId("x".into()).is_retryable());
        assert!(!RegistrationError::DuplicateReceiptNumber("VEYG-1".into()).is_retryable());
    }

    #[test]
    fn test_constraint_mapping() {
        assert_eq!(UniqueKey::from_constraint("registrations_user_day_key"), Some(UniqueKey::UserDay));
        assert_eq!(UniqueKey::from_constraint("something_else"), None);
    }
}
