use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use uuid::Uuid;

use super::error::StoreError;
use crate::models::{ApprovalStatus, GameDay, NewRegistration, PaymentStatus, RegistrationRow};
use crate::pagination::LimitOffset;

/// Predicate for counting and listing registrations. `None` fields match everything.
#[derive(Debug, Clone, Default)]
pub struct RegistrationFilter {
    pub user_id: Option<String>,
    /// Exact game name.
    pub game_name: Option<String>,
    /// Case-insensitive substring of the team leader's college.
    pub college_contains: Option<String>,
    pub game_day: Option<GameDay>,
    pub approval_status: Option<ApprovalStatus>,
    pub payment_status: Option<PaymentStatus>,
}

impl RegistrationFilter {
    pub fn matches(&self, row: &RegistrationRow) -> bool {
        if let Some(user_id) = &self.user_id {
            if &row.user_id != user_id {
                return false;
            }
        }
        if let Some(game_name) = &self.game_name {
            if &row.game_name != game_name {
                return false;
            }
        }
        if let Some(college) = &self.college_contains {
            let stored = row.team_leader.college.to_lowercase();
            if !stored.contains(&college.trim().to_lowercase()) {
                return false;
            }
        }
        if self.game_day.is_some_and(|day| day != row.game_day) {
            return false;
        }
        if self.approval_status.is_some_and(|s| s != row.approval_status) {
            return false;
        }
        if self.payment_status.is_some_and(|s| s != row.payment_status) {
            return false;
        }
        true
    }
}

/// Admin-side status change; `None` leaves the field untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct StatusUpdate {
    pub approval_status: Option<ApprovalStatus>,
    pub payment_status: Option<PaymentStatus>,
}

/// Persistence contract shared by admission control and identity assignment.
///
/// Implementations must enforce uniqueness of `(user_id, game_day)`,
/// `registration_id` and `receipt_number` at insert time and report a violation
/// as [`StoreError::Duplicate`]. Concurrent conflicting inserts have exactly one
/// winner.
#[async_trait]
pub trait RegistrationStore: Send + Sync {
    async fn find_by_user_id(&self, user_id: &str) -> Result<Vec<RegistrationRow>, StoreError>;

    async fn count_where(&self, filter: &RegistrationFilter) -> Result<i64, StoreError>;

    async fn exists_by_registration_id(&self, registration_id: &str) -> Result<bool, StoreError>;

    async fn insert_unique(&self, record: NewRegistration) -> Result<RegistrationRow, StoreError>;

    /// Atomically advances the named counter to `max(current, floor) + 1` and returns it.
    async fn next_sequence(&self, name: &str, floor: i64) -> Result<i64, StoreError>;

    async fn get(&self, id: Uuid) -> Result<Option<RegistrationRow>, StoreError>;

    async fn list(
        &self,
        filter: &RegistrationFilter,
        page: LimitOffset,
    ) -> Result<Vec<RegistrationRow>, StoreError>;

    async fn update_status(
        &self,
        id: Uuid,
        update: StatusUpdate,
    ) -> Result<Option<RegistrationRow>, StoreError>;

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError>;

    async fn ping(&self) -> Result<(), StoreError>;
}

/// Runs a store call with an upper bound; an elapsed call is reported as
/// [`StoreError::Timeout`] and may or may not have taken effect.
pub async fn bounded<T, F>(limit: Duration, call: F) -> Result<T, StoreError>
where
    F: Future<Output = Result<T, StoreError>>,
{
    tokio::time::timeout(limit, call)
        .await
        .map_err(|_| StoreError::Timeout(limit))?
}
