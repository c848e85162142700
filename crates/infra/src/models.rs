use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

/// One of the two competition days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, sqlx::Type, Serialize, Deserialize)]
#[sqlx(type_name = "game_day", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum GameDay {
    Day1,
    Day2,
}

impl GameDay {
    pub fn from_number(day: u8) -> Option<Self> {
        match day {
            1 => Some(GameDay::Day1),
            2 => Some(GameDay::Day2),
            _ => None,
        }
    }

    pub fn number(self) -> u8 {
        match self {
            GameDay::Day1 => 1,
            GameDay::Day2 => 2,
        }
    }
}

impl fmt::Display for GameDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "day{}", self.number())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type, Serialize, Deserialize)]
#[sqlx(type_name = "registration_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum RegistrationType {
    Individual,
    Team,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type, Serialize, Deserialize)]
#[sqlx(type_name = "approval_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ApprovalStatus {
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type, Serialize, Deserialize)]
#[sqlx(type_name = "payment_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Failed,
}

/// Team leader or team member as entered on the registration form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub name: String,
    pub email: String,
    pub college: String,
    pub contact: String,
    pub department: Option<String>,
    pub year: Option<String>,
    pub enrollment_number: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberType {
    Leader,
    Member,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamMemberId {
    pub member_id: String,
    pub member_name: String,
    pub member_type: MemberType,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct RegistrationRow {
    pub id: Uuid,
    pub user_id: String,
    pub game_id: String,
    pub game_name: String,
    pub game_day: GameDay,
    pub registration_type: RegistrationType,
    pub team_leader: Json<Participant>,
    pub team_members: Json<Vec<Participant>>,
    pub team_size: i32,
    pub registration_id: String,
    pub receipt_number: String,
    pub team_ids: Json<Vec<TeamMemberId>>,
    pub approval_status: ApprovalStatus,
    pub payment_status: PaymentStatus,
    pub total_fee_cents: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A fully assigned registration ready for the unique insert.
#[derive(Debug, Clone)]
pub struct NewRegistration {
    pub user_id: String,
    pub game_id: String,
    pub game_name: String,
    pub game_day: GameDay,
    pub registration_type: RegistrationType,
    pub team_leader: Participant,
    pub team_members: Vec<Participant>,
    pub registration_id: String,
    pub receipt_number: String,
    pub team_ids: Vec<TeamMemberId>,
    pub total_fee_cents: i64,
}

impl NewRegistration {
    pub fn team_size(&self) -> i32 {
        1 + self.team_members.len() as i32
    }
}
