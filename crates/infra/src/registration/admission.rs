use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error};

use super::config::RegistrationConfig;
use super::error::{DenyReason, RegistrationError};
use super::store::{bounded, RegistrationStore};
use crate::models::{GameDay, RegistrationRow};

pub const MAX_REGISTRATIONS_PER_USER: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Admission {
    Allow,
    Deny(DenyReason),
}

impl Admission {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Admission::Allow)
    }

    pub fn into_result(self) -> Result<(), DenyReason> {
        match self {
            Admission::Allow => Ok(()),
            Admission::Deny(reason) => Err(reason),
        }
    }
}

/// Fast-fail gate in front of registration inserts.
///
/// The check is read-only. Two racing attempts can both be allowed here; the
/// store's `(user_id, game_day)` constraint decides the winner.
#[derive(Clone)]
pub struct AdmissionController {
    store: Arc<dyn RegistrationStore>,
    timeout: Duration,
}

impl AdmissionController {
    pub fn new(store: Arc<dyn RegistrationStore>, config: &RegistrationConfig) -> Self {
        Self {
            store,
            timeout: config.store_timeout,
        }
    }

    pub async fn check_admission(
        &self,
        user_id: &str,
        requested_day: u8,
    ) -> Result<Admission, RegistrationError> {
        if user_id.trim().is_empty() {
            return Err(RegistrationError::InvalidUser);
        }
        let day = GameDay::from_number(requested_day)
            .ok_or(RegistrationError::InvalidDay(requested_day))?;

        let existing = bounded(self.timeout, self.store.find_by_user_id(user_id))
            .await
            .map_err(|e| {
                error!(user_id, %day, error = %e, "admission check failed");
                RegistrationError::AdmissionCheckFailed(e)
            })?;

        let admission = decide(day, &existing);
        debug!(user_id, %day, existing = existing.len(), allowed = admission.is_allowed(), "admission decided");
        Ok(admission)
    }
}

/// Admission rule over a user's current registrations.
pub fn decide(day: GameDay, existing: &[RegistrationRow]) -> Admission {
    if let Some(conflict) = existing.iter().find(|r| r.game_day == day) {
        return Admission::Deny(DenyReason::DayAlreadyUsed {
            day,
            game_name: conflict.game_name.clone(),
            registration_id: conflict.registration_id.clone(),
        });
    }

    if existing.len() >= MAX_REGISTRATIONS_PER_USER {
        return Admission::Deny(DenyReason::GlobalCapReached {
            existing: existing
                .iter()
                .map(|r| (r.game_name.clone(), r.game_day))
                .collect(),
        });
    }

    Admission::Allow
}
