use async_graphql::{Enum, InputObject, SimpleObject, ID};
use chrono::{DateTime, Utc};
use infra::models;
use infra::registration::{Admission, DenyReason};

#[derive(Enum, Copy, Clone, Eq, PartialEq, Debug)]
#[graphql(remote = "infra::models::GameDay")]
pub enum GameDay {
    Day1,
    Day2,
}

#[derive(Enum, Copy, Clone, Eq, PartialEq, Debug)]
#[graphql(remote = "infra::models::RegistrationType")]
pub enum RegistrationType {
    Individual,
    Team,
}

#[derive(Enum, Copy, Clone, Eq, PartialEq, Debug)]
#[graphql(remote = "infra::models::ApprovalStatus")]
pub enum ApprovalStatus {
    Pending,
    Approved,
    Rejected,
}

#[derive(Enum, Copy, Clone, Eq, PartialEq, Debug)]
#[graphql(remote = "infra::models::PaymentStatus")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Failed,
}

#[derive(Enum, Copy, Clone, Eq, PartialEq, Debug)]
#[graphql(remote = "infra::models::MemberType")]
pub enum MemberType {
    Leader,
    Member,
}

#[derive(SimpleObject, Clone)]
pub struct Participant {
    pub name: String,
    pub email: String,
    pub college: String,
    pub contact: String,
    pub department: Option<String>,
    pub year: Option<String>,
    pub enrollment_number: Option<String>,
}

impl From<models::Participant> for Participant {
    fn from(p: models::Participant) -> Self {
        Self {
            name: p.name,
            email: p.email,
            college: p.college,
            contact: p.contact,
            department: p.department,
            year: p.year,
            enrollment_number: p.enrollment_number,
        }
    }
}

#[derive(InputObject, Clone)]
pub struct ParticipantInput {
    pub name: String,
    pub email: String,
    pub college: String,
    pub contact: String,
    pub department: Option<String>,
    pub year: Option<String>,
    pub enrollment_number: Option<String>,
}

impl From<ParticipantInput> for models::Participant {
    fn from(p: ParticipantInput) -> Self {
        Self {
            name: p.name,
            email: p.email,
            college: p.college,
            contact: p.contact,
            department: p.department,
            year: p.year,
            enrollment_number: p.enrollment_number,
        }
    }
}

#[derive(SimpleObject, Clone)]
pub struct TeamMemberId {
    pub member_id: String,
    pub member_name: String,
    pub member_type: MemberType,
}

#[derive(SimpleObject, Clone)]
pub struct Registration {
    pub id: ID,
    pub user_id: String,
    pub game_id: String,
    pub game_name: String,
    pub game_day: GameDay,
    pub registration_type: RegistrationType,
    pub team_leader: Participant,
    pub team_members: Vec<Participant>,
    pub team_size: i32,
    pub registration_id: String,
    pub receipt_number: String,
    pub team_ids: Vec<TeamMemberId>,
    pub approval_status: ApprovalStatus,
    pub payment_status: PaymentStatus,
    pub total_fee_cents: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<models::RegistrationRow> for Registration {
    fn from(r: models::RegistrationRow) -> Self {
        Self {
            id: ID(r.id.to_string()),
            user_id: r.user_id,
            game_id: r.game_id,
            game_name: r.game_name,
            game_day: r.game_day.into(),
            registration_type: r.registration_type.into(),
            team_leader: r.team_leader.0.into(),
            team_members: r.team_members.0.into_iter().map(Into::into).collect(),
            team_size: r.team_size,
            registration_id: r.registration_id,
            receipt_number: r.receipt_number,
            team_ids: r
                .team_ids
                .0
                .into_iter()
                .map(|m| TeamMemberId {
                    member_id: m.member_id,
                    member_name: m.member_name,
                    member_type: m.member_type.into(),
                })
                .collect(),
            approval_status: r.approval_status.into(),
            payment_status: r.payment_status.into(),
            total_fee_cents: r.total_fee_cents,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

/// Outcome of an admission check, with the games that block it when denied.
#[derive(SimpleObject, Clone)]
pub struct AdmissionDecision {
    pub allowed: bool,
    pub code: Option<String>,
    pub message: Option<String>,
    pub conflicting_games: Vec<String>,
}

impl From<Admission> for AdmissionDecision {
    fn from(admission: Admission) -> Self {
        match admission {
            Admission::Allow => Self {
                allowed: true,
                code: None,
                message: None,
                conflicting_games: Vec::new(),
            },
            Admission::Deny(reason) => {
                let message = reason.to_string();
                let (code, conflicting_games) = match reason {
                    DenyReason::DayAlreadyUsed { game_name, .. } => ("DAY_ALREADY_USED", vec![game_name]),
                    DenyReason::GlobalCapReached { existing } => (
                        "GLOBAL_CAP_REACHED",
                        existing.into_iter().map(|(game, _)| game).collect(),
                    ),
                };
                Self {
                    allowed: false,
                    code: Some(code.to_string()),
                    message: Some(message),
                    conflicting_games,
                }
            }
        }
    }
}

#[derive(InputObject)]
pub struct RegisterForGameInput {
    pub game_id: String,
    pub game_name: String,
    /// 1 or 2.
    pub game_day: u8,
    pub registration_type: RegistrationType,
    pub team_leader: ParticipantInput,
    #[graphql(default)]
    pub team_members: Vec<ParticipantInput>,
    pub total_fee_cents: i64,
    pub user_id: Option<String>, // Optional: if provided, admin can register another user
}

#[derive(InputObject, Default)]
pub struct RegistrationFilterInput {
    pub user_id: Option<String>,
    pub game_name: Option<String>,
    pub college: Option<String>,
    pub game_day: Option<GameDay>,
    pub approval_status: Option<ApprovalStatus>,
    pub payment_status: Option<PaymentStatus>,
}

impl From<RegistrationFilterInput> for infra::registration::RegistrationFilter {
    fn from(f: RegistrationFilterInput) -> Self {
        Self {
            user_id: f.user_id,
            game_name: f.game_name,
            college_contains: f.college,
            game_day: f.game_day.map(Into::into),
            approval_status: f.approval_status.map(Into::into),
            payment_status: f.payment_status.map(Into::into),
        }
    }
}
