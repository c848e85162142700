//! Human-readable registration ids and receipt numbers.
//!
//! Id layout:
//!
//! ```text
//! individual  {college}-{game}-{day}-1 [{leader}]
//! team        {college}-{game}-{day}-{team}-{member} [{name}]
//! collision   same stem, then -{nn} (10..=99) before the bracket
//! fallback    {college3}-GEN-{unix_millis} [{leader}]
//! ```
//!
//! `team` is a per (college code, game code) sequence and `member` is 1 for the leader,
//! then 2.. for the members in the order they were entered. The bracketed name
//! is cosmetic; the store's unique constraint on `registration_id` is what
//! makes an id unique.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use rand::Rng;
use tracing::{debug, warn};

use super::codes::{self, CodeError};
use super::config::RegistrationConfig;
use super::error::{RegistrationError, StoreError};
use super::store::{bounded, RegistrationFilter, RegistrationStore};
use crate::models::{GameDay, MemberType, Participant, RegistrationType, TeamMemberId};

const RECEIPT_SEQUENCE: &str = "receipt";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdResult {
    Individual(String),
    Team {
        leader_id: String,
        /// Leader first, then members in entry order.
        members: Vec<TeamMemberId>,
    },
}

impl IdResult {
    /// The id stored as the registration's `registration_id`.
    pub fn registration_id(&self) -> &str {
        match self {
            IdResult::Individual(id) => id,
            IdResult::Team { leader_id, .. } => leader_id,
        }
    }

    pub fn team_ids(&self) -> &[TeamMemberId] {
        match self {
            IdResult::Individual(_) => &[],
            IdResult::Team { members, .. } => members,
        }
    }

    pub fn into_parts(self) -> (String, Vec<TeamMemberId>) {
        match self {
            IdResult::Individual(id) => (id, Vec::new()),
            IdResult::Team { leader_id, members } => (leader_id, members),
        }
    }
}

#[derive(Clone)]
pub struct IdentityAssigner {
    store: Arc<dyn RegistrationStore>,
    timeout: Duration,
    receipt_prefix: String,
    collision_attempts: u8,
}

impl IdentityAssigner {
    pub fn new(store: Arc<dyn RegistrationStore>, config: &RegistrationConfig) -> Self {
        Self {
            store,
            timeout: config.store_timeout,
            receipt_prefix: config.receipt_prefix.clone(),
            collision_attempts: config.collision_attempts,
        }
    }

    /// Assigns the registration id(s) for one registration.
    ///
    /// Naming problems never fail the call: an underivable code or an
    /// unresolvable collision falls back to the timestamp scheme. Only store
    /// failures surface, as [`RegistrationError::AssignmentFailed`].
    pub async fn assign_ids(
        &self,
        leader_name: &str,
        college_name: &str,
        game_name: &str,
        game_day: GameDay,
        registration_type: RegistrationType,
        team_members: &[Participant],
    ) -> Result<IdResult, RegistrationError> {
        let leader_name = leader_name.trim();

        let (college_code, game_code) = match derive_codes(college_name, game_name) {
            Ok(codes) => codes,
            Err(e) => {
                warn!(college_name, game_name, error = %e, "assignment degraded: code derivation failed");
                return Ok(fallback_ids(college_name, leader_name, registration_type, team_members));
            }
        };
        let stem = format!("{college_code}-{game_code}-{}", game_day.number());

        let ids = match registration_type {
            RegistrationType::Individual => {
                let id = self.resolve_collision(&format!("{stem}-1"), leader_name, college_name).await?;
                IdResult::Individual(id)
            }
            RegistrationType::Team => {
                let team_number = self
                    .next_team_number(&college_code, &game_code, college_name, game_name)
                    .await?;
                let team_stem = format!("{stem}-{team_number}");
                let leader_id = self
                    .resolve_collision(&format!("{team_stem}-1"), leader_name, college_name)
                    .await?;

                let mut members = Vec::with_capacity(team_members.len() + 1);
                members.push(TeamMemberId {
                    member_id: leader_id.clone(),
                    member_name: leader_name.to_string(),
                    member_type: MemberType::Leader,
                });
                for (position, member) in team_members.iter().enumerate() {
                    let name = member.name.trim();
                    members.push(TeamMemberId {
                        member_id: display_id(&format!("{team_stem}-{}", position + 2), name),
                        member_name: name.to_string(),
                        member_type: MemberType::Member,
                    });
                }
                IdResult::Team { leader_id, members }
            }
        };

        debug!(registration_id = ids.registration_id(), "registration id assigned");
        Ok(ids)
    }

    /// Next receipt number, `{prefix}-{n}`. Falls back to `{prefix}-{unix_millis}`
    /// when the store cannot be reached.
    pub async fn assign_receipt_number(&self) -> String {
        match self.next_receipt_sequence().await {
            Ok(n) => format!("{}-{n}", self.receipt_prefix),
            Err(e) => {
                warn!(error = %e, "receipt number fell back to timestamp");
                format!("{}-{}", self.receipt_prefix, Utc::now().timestamp_millis())
            }
        }
    }

    async fn next_receipt_sequence(&self) -> Result<i64, StoreError> {
        let total = bounded(self.timeout, self.store.count_where(&RegistrationFilter::default())).await?;
        bounded(self.timeout, self.store.next_sequence(RECEIPT_SEQUENCE, total)).await
    }

    /// Team ordinal for a (college code, game code) pair, seeded with the number
    /// of registrations that already exist for the game and college. Spellings
    /// that map to the same code share one counter.
    async fn next_team_number(
        &self,
        college_code: &str,
        game_code: &str,
        college_name: &str,
        game_name: &str,
    ) -> Result<i64, RegistrationError> {
        let filter = RegistrationFilter {
            game_name: Some(game_name.to_string()),
            college_contains: Some(college_name.trim().to_string()),
            ..Default::default()
        };
        let existing = bounded(self.timeout, self.store.count_where(&filter))
            .await
            .map_err(RegistrationError::AssignmentFailed)?;

        let sequence = format!("team:{college_code}:{game_code}");
        bounded(self.timeout, self.store.next_sequence(&sequence, existing))
            .await
            .map_err(RegistrationError::AssignmentFailed)
    }

    async fn resolve_collision(
        &self,
        base: &str,
        name: &str,
        college_name: &str,
    ) -> Result<String, RegistrationError> {
        let candidate = display_id(base, name);
        if !self.id_exists(&candidate).await? {
            return Ok(candidate);
        }

        for _ in 0..self.collision_attempts {
            let candidate = display_id(&format!("{base}-{}", disambiguator()), name);
            if !self.id_exists(&candidate).await? {
                return Ok(candidate);
            }
        }

        warn!(base, attempts = self.collision_attempts, "assignment degraded: id collisions not resolved");
        Ok(display_id(&fallback_stem(college_name), name))
    }

    async fn id_exists(&self, registration_id: &str) -> Result<bool, RegistrationError> {
        bounded(self.timeout, self.store.exists_by_registration_id(registration_id))
            .await
            .map_err(RegistrationError::AssignmentFailed)
    }
}

fn derive_codes(college_name: &str, game_name: &str) -> Result<(String, String), CodeError> {
    Ok((codes::college_code(college_name)?, codes::game_code(game_name)?))
}

fn display_id(stem: &str, name: &str) -> String {
    format!("{stem} [{name}]")
}

fn disambiguator() -> u8 {
    rand::thread_rng().gen_range(10..100)
}

fn fallback_stem(college_name: &str) -> String {
    let prefix: String = college_name
        .trim()
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .take(3)
        .map(|c| c.to_ascii_uppercase())
        .collect();
    let prefix = if prefix.is_empty() { "UNK".to_string() } else { prefix };
    format!("{prefix}-GEN-{}", Utc::now().timestamp_millis())
}

fn fallback_ids(
    college_name: &str,
    leader_name: &str,
    registration_type: RegistrationType,
    team_members: &[Participant],
) -> IdResult {
    let stem = fallback_stem(college_name);
    let leader_id = display_id(&stem, leader_name);

    match registration_type {
        RegistrationType::Individual => IdResult::Individual(leader_id),
        RegistrationType::Team => {
            let mut members = vec![TeamMemberId {
                member_id: leader_id.clone(),
                member_name: leader_name.to_string(),
                member_type: MemberType::Leader,
            }];
            members.extend(team_members.iter().enumerate().map(|(position, member)| {
                let name = member.name.trim();
                TeamMemberId {
                    member_id: display_id(&format!("{stem}-{}", position + 2), name),
                    member_name: name.to_string(),
                    member_type: MemberType::Member,
                }
            }));
            IdResult::Team { leader_id, members }
        }
    }
}
