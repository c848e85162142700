use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info, warn};
use uuid::Uuid;

use super::admission::{decide, Admission, AdmissionController};
use super::config::RegistrationConfig;
use super::error::{RegistrationError, StoreError, UniqueKey};
use super::identity::IdentityAssigner;
use super::store::{bounded, RegistrationFilter, RegistrationStore, StatusUpdate};
use crate::models::{
    ApprovalStatus, GameDay, NewRegistration, Participant, PaymentStatus, RegistrationRow,
    RegistrationType,
};
use crate::pagination::LimitOffset;

/// A registration attempt as submitted by a student.
#[derive(Debug, Clone)]
pub struct RegistrationRequest {
    pub user_id: String,
    pub game_id: String,
    pub game_name: String,
    /// 1 or 2.
    pub game_day: u8,
    pub registration_type: RegistrationType,
    pub team_leader: Participant,
    pub team_members: Vec<Participant>,
    pub total_fee_cents: i64,
}

/// Who is acting on a registration.
#[derive(Debug, Clone)]
pub struct Actor {
    pub user_id: String,
    pub is_admin: bool,
}

impl Actor {
    pub fn student(user_id: impl Into<String>) -> Self {
        Self { user_id: user_id.into(), is_admin: false }
    }

    pub fn admin(user_id: impl Into<String>) -> Self {
        Self { user_id: user_id.into(), is_admin: true }
    }
}

/// Admission, id assignment and the unique insert, plus the admin lifecycle.
#[derive(Clone)]
pub struct RegistrationService {
    store: Arc<dyn RegistrationStore>,
    admission: AdmissionController,
    identity: IdentityAssigner,
    timeout: Duration,
}

impl RegistrationService {
    pub fn new(store: Arc<dyn RegistrationStore>, config: RegistrationConfig) -> Self {
        Self {
            admission: AdmissionController::new(store.clone(), &config),
            identity: IdentityAssigner::new(store.clone(), &config),
            timeout: config.store_timeout,
            store,
        }
    }

    pub fn store(&self) -> &Arc<dyn RegistrationStore> {
        &self.store
    }

    pub async fn check(&self, user_id: &str, day: u8) -> Result<Admission, RegistrationError> {
        self.admission.check_admission(user_id, day).await
    }

    pub async fn register(&self, request: RegistrationRequest) -> Result<RegistrationRow, RegistrationError> {
        validate(&request)?;

        let admission = self.admission.check_admission(&request.user_id, request.game_day).await?;
        if let Err(reason) = admission.into_result() {
            warn!(user_id = %request.user_id, game = %request.game_name, %reason, "registration denied");
            return Err(reason.into());
        }
        let day = GameDay::from_number(request.game_day)
            .ok_or(RegistrationError::InvalidDay(request.game_day))?;

        let ids = self
            .identity
            .assign_ids(
                &request.team_leader.name,
                &request.team_leader.college,
                &request.game_name,
                day,
                request.registration_type,
                &request.team_members,
            )
            .await?;
        let receipt_number = self.identity.assign_receipt_number().await;
        let (registration_id, team_ids) = ids.into_parts();

        let record = NewRegistration {
            user_id: request.user_id,
            game_id: request.game_id,
            game_name: request.game_name,
            game_day: day,
            registration_type: request.registration_type,
            team_leader: request.team_leader,
            team_members: request.team_members,
            registration_id: registration_id.clone(),
            receipt_number: receipt_number.clone(),
            team_ids,
            total_fee_cents: request.total_fee_cents,
        };
        let user_id = record.user_id.clone();

        match bounded(self.timeout, self.store.insert_unique(record)).await {
            Ok(row) => {
                info!(
                    user_id = %row.user_id,
                    registration_id = %row.registration_id,
                    receipt_number = %row.receipt_number,
                    game = %row.game_name,
                    day = %row.game_day,
                    "registration created"
                );
                Ok(row)
            }
            Err(StoreError::Duplicate(UniqueKey::UserDay)) => Err(self.lost_day_race(&user_id, day, registration_id).await),
            Err(StoreError::Duplicate(UniqueKey::RegistrationId)) => {
                warn!(%registration_id, "registration insert hit a duplicate registration id");
                Err(RegistrationError::DuplicateRegistrationId(registration_id))
            }
            Err(StoreError::Duplicate(UniqueKey::ReceiptNumber)) => {
                warn!(%receipt_number, "registration insert hit a duplicate receipt number");
                Err(RegistrationError::DuplicateReceiptNumber(receipt_number))
            }
            Err(e) => {
                error!(%user_id, error = %e, "registration insert failed");
                Err(RegistrationError::StoreUnavailable(e))
            }
        }
    }

    /// Re-reads the user's registrations after a `(user_id, game_day)` violation
    /// so the denial can name the registration that won.
    async fn lost_day_race(&self, user_id: &str, day: GameDay, registration_id: String) -> RegistrationError {
        match bounded(self.timeout, self.store.find_by_user_id(user_id)).await {
            Ok(existing) => match decide(day, &existing) {
                Admission::Deny(reason) => reason.into(),
                // the winner is already gone; let the caller start over
                Admission::Allow => RegistrationError::DuplicateRegistrationId(registration_id),
            },
            Err(e) => RegistrationError::AdmissionCheckFailed(e),
        }
    }

    pub async fn my_registrations(&self, user_id: &str) -> Result<Vec<RegistrationRow>, RegistrationError> {
        bounded(self.timeout, self.store.find_by_user_id(user_id))
            .await
            .map_err(RegistrationError::StoreUnavailable)
    }

    pub async fn get(&self, actor: &Actor, id: Uuid) -> Result<RegistrationRow, RegistrationError> {
        let row = self.load(id).await?;
        if !actor.is_admin && row.user_id != actor.user_id {
            return Err(RegistrationError::Forbidden("not your registration".into()));
        }
        Ok(row)
    }

    pub async fn list(
        &self,
        actor: &Actor,
        filter: RegistrationFilter,
        page: LimitOffset,
    ) -> Result<Vec<RegistrationRow>, RegistrationError> {
        require_admin(actor)?;
        bounded(self.timeout, self.store.list(&filter, page))
            .await
            .map_err(RegistrationError::StoreUnavailable)
    }

    pub async fn set_approval_status(
        &self,
        actor: &Actor,
        id: Uuid,
        status: ApprovalStatus,
    ) -> Result<RegistrationRow, RegistrationError> {
        require_admin(actor)?;
        let update = StatusUpdate { approval_status: Some(status), ..Default::default() };
        let row = self.update(id, update).await?;
        info!(%id, admin = %actor.user_id, status = ?status, "approval status changed");
        Ok(row)
    }

    pub async fn set_payment_status(
        &self,
        actor: &Actor,
        id: Uuid,
        status: PaymentStatus,
    ) -> Result<RegistrationRow, RegistrationError> {
        require_admin(actor)?;
        let update = StatusUpdate { payment_status: Some(status), ..Default::default() };
        let row = self.update(id, update).await?;
        info!(%id, admin = %actor.user_id, status = ?status, "payment status changed");
        Ok(row)
    }

    /// Hard delete. Students may only remove their own registrations that are not yet approved.
    pub async fn delete(&self, actor: &Actor, id: Uuid) -> Result<(), RegistrationError> {
        let row = self.load(id).await?;
        if !actor.is_admin {
            if row.user_id != actor.user_id {
                return Err(RegistrationError::Forbidden("not your registration".into()));
            }
            if row.approval_status == ApprovalStatus::Approved {
                return Err(RegistrationError::Forbidden("approved registrations can only be removed by an admin".into()));
            }
        }

        let deleted = bounded(self.timeout, self.store.delete(id))
            .await
            .map_err(RegistrationError::StoreUnavailable)?;
        if !deleted {
            return Err(RegistrationError::NotFound(id));
        }
        info!(%id, by = %actor.user_id, registration_id = %row.registration_id, "registration deleted");
        Ok(())
    }

    async fn load(&self, id: Uuid) -> Result<RegistrationRow, RegistrationError> {
        bounded(self.timeout, self.store.get(id))
            .await
            .map_err(RegistrationError::StoreUnavailable)?
            .ok_or(RegistrationError::NotFound(id))
    }

    async fn update(&self, id: Uuid, update: StatusUpdate) -> Result<RegistrationRow, RegistrationError> {
        bounded(self.timeout, self.store.update_status(id, update))
            .await
            .map_err(RegistrationError::StoreUnavailable)?
            .ok_or(RegistrationError::NotFound(id))
    }
}

fn require_admin(actor: &Actor) -> Result<(), RegistrationError> {
    if actor.is_admin {
        Ok(())
    } else {
        Err(RegistrationError::Forbidden("admin privileges required".into()))
    }
}

fn validate(request: &RegistrationRequest) -> Result<(), RegistrationError> {
    let invalid = |msg: &str| Err(RegistrationError::InvalidRequest(msg.to_string()));

    if request.game_id.trim().is_empty() || request.game_name.trim().is_empty() {
        return invalid("game is required");
    }
    if request.team_leader.name.trim().is_empty() {
        return invalid("team leader name is required");
    }
    if request.team_members.iter().any(|m| m.name.trim().is_empty()) {
        return invalid("team member names are required");
    }
    if request.total_fee_cents < 0 {
        return invalid("fee must not be negative");
    }
    match request.registration_type {
        RegistrationType::Individual if !request.team_members.is_empty() => {
            invalid("individual registrations cannot have team members")
        }
        RegistrationType::Team if request.team_members.is_empty() => {
            invalid("team registrations need at least one member")
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::registration::error::DenyReason;
    use crate::registration::memory::MemoryStore;

    fn request(user: &str, game: &str, day: u8) -> RegistrationRequest {
        RegistrationRequest {
            user_id: user.into(),
            game_id: game.to_lowercase().replace(' ', "-"),
            game_name: game.into(),
            game_day: day,
            registration_type: RegistrationType::Individual,
            team_leader: Participant {
                name: format!("Leader {user}"),
                email: format!("{user}@example.com"),
                college: "Saffrony Institute of Technology".into(),
                contact: "9999999999".into(),
                ..Default::default()
            },
            team_members: vec![],
            total_fee_cents: 10_000,
        }
    }

    fn service() -> (Arc<MemoryStore>, RegistrationService) {
        let store = Arc::new(MemoryStore::new());
        let service = RegistrationService::new(store.clone(), RegistrationConfig::default());
        (store, service)
    }

    #[tokio::test]
    async fn test_register_assigns_ids_and_receipt() {
        let (_, service) = service();
        let row = service.register(request("u1", "Algo Cricket", 1)).await.unwrap();

        assert_eq!(row.registration_id, "SAF-ACR-1-1 [Leader u1]");
        assert_eq!(row.receipt_number, "VEYG-1");
        assert_eq!(row.team_size, 1);
        assert_eq!(row.approval_status, ApprovalStatus::Pending);
        assert_eq!(row.payment_status, PaymentStatus::Pending);
    }

    #[tokio::test]
    async fn test_team_registration_keeps_member_order() {
        let (_, service) = service();
        let mut req = request("u1", "Box Cricket", 2);
        req.registration_type = RegistrationType::Team;
        req.team_members = ["Bob", "Carol", "Dave"]
            .into_iter()
            .map(|name| Participant { name: name.into(), ..Default::default() })
            .collect();

        let row = service.register(req).await.unwrap();
        assert_eq!(row.team_size, 4);
        assert_eq!(row.registration_id, "SAF-BCR-2-1-1 [Leader u1]");
        let ids: Vec<&str> = row.team_ids.iter().map(|m| m.member_id.as_str()).collect();
        assert_eq!(
            ids,
            vec![
                "SAF-BCR-2-1-1 [Leader u1]",
                "SAF-BCR-2-1-2 [Bob]",
                "SAF-BCR-2-1-3 [Carol]",
                "SAF-BCR-2-1-4 [Dave]",
            ]
        );
    }

    #[tokio::test]
    async fn test_scenario_two_days_then_denied() {
        let (store, service) = service();

        let first = service.register(request("u1", "Algo Cricket", 1)).await.unwrap();
        let err = service.register(request("u1", "Chess", 1)).await.unwrap_err();
        match err {
            RegistrationError::Denied(DenyReason::DayAlreadyUsed { game_name, registration_id, .. }) => {
                assert_eq!(game_name, "Algo Cricket");
                assert_eq!(registration_id, first.registration_id);
            }
            other => panic!("unexpected {other:?}"),
        }

        service.register(request("u1", "Chess", 2)).await.unwrap();
        assert!(matches!(
            service.register(request("u1", "Valorant", 2)).await,
            Err(RegistrationError::Denied(_))
        ));
        assert!(matches!(
            service.register(request("u1", "Valorant", 1)).await,
            Err(RegistrationError::Denied(_))
        ));
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn test_invalid_requests_are_rejected() {
        let (store, service) = service();

        let mut team_without_members = request("u1", "Chess", 1);
        team_without_members.registration_type = RegistrationType::Team;
        assert!(matches!(
            service.register(team_without_members).await,
            Err(RegistrationError::InvalidRequest(_))
        ));

        let mut negative_fee = request("u1", "Chess", 1);
        negative_fee.total_fee_cents = -1;
        assert!(matches!(service.register(negative_fee).await, Err(RegistrationError::InvalidRequest(_))));

        let mut blank_member = request("u1", "Chess", 1);
        blank_member.registration_type = RegistrationType::Team;
        blank_member.team_members = vec![
            Participant { name: "Bob".into(), ..Default::default() },
            Participant { name: "   ".into(), ..Default::default() },
        ];
        assert!(matches!(service.register(blank_member).await, Err(RegistrationError::InvalidRequest(_))));

        assert!(matches!(
            service.register(request("u1", "Chess", 5)).await,
            Err(RegistrationError::InvalidDay(5))
        ));
        assert!(store.is_empty().await);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_attempts_keep_invariants() {
        let (store, service) = service();

        let mut handles = Vec::new();
        for user in 0..20 {
            for (game, day) in [("Algo Cricket", 1), ("Chess", 2), ("Valorant", 1), ("BGMI", 2)] {
                let service = service.clone();
                let req = request(&format!("u{user}"), game, day);
                handles.push(tokio::spawn(async move { service.register(req).await }));
            }
        }
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) | Err(RegistrationError::Denied(_)) => {}
                Err(RegistrationError::DuplicateRegistrationId(_))
                | Err(RegistrationError::DuplicateReceiptNumber(_)) => {}
                Err(other) => panic!("unexpected {other:?}"),
            }
        }

        let rows = store.list(&RegistrationFilter::default(), LimitOffset { limit: 1_000, offset: 0 }).await.unwrap();
        for user in 0..20 {
            let user_id = format!("u{user}");
            let mine: Vec<_> = rows.iter().filter(|r| r.user_id == user_id).collect();
            assert_eq!(mine.len(), 2, "{user_id}");
            assert_eq!(mine.iter().filter(|r| r.game_day == GameDay::Day1).count(), 1);
            assert_eq!(mine.iter().filter(|r| r.game_day == GameDay::Day2).count(), 1);
        }
        let ids: HashSet<_> = rows.iter().map(|r| &r.registration_id).collect();
        let receipts: HashSet<_> = rows.iter().map(|r| &r.receipt_number).collect();
        assert_eq!(ids.len(), rows.len());
        assert_eq!(receipts.len(), rows.len());
    }

    #[tokio::test]
    async fn test_admin_lifecycle() {
        let (_, service) = service();
        let student = Actor::student("u1");
        let admin = Actor::admin("root");
        let row = service.register(request("u1", "Chess", 1)).await.unwrap();

        assert!(matches!(
            service.set_approval_status(&student, row.id, ApprovalStatus::Approved).await,
            Err(RegistrationError::Forbidden(_))
        ));
        let updated = service.set_payment_status(&admin, row.id, PaymentStatus::Paid).await.unwrap();
        assert_eq!(updated.payment_status, PaymentStatus::Paid);
        let updated = service.set_approval_status(&admin, row.id, ApprovalStatus::Approved).await.unwrap();
        assert_eq!(updated.approval_status, ApprovalStatus::Approved);

        // approved: only an admin may remove it
        assert!(matches!(service.delete(&student, row.id).await, Err(RegistrationError::Forbidden(_))));
        assert!(matches!(
            service.delete(&Actor::student("u2"), row.id).await,
            Err(RegistrationError::Forbidden(_))
        ));
        service.delete(&admin, row.id).await.unwrap();
        assert!(matches!(service.get(&admin, row.id).await, Err(RegistrationError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_student_can_delete_pending_and_register_again() {
        let (_, service) = service();
        let student = Actor::student("u1");
        let row = service.register(request("u1", "Chess", 1)).await.unwrap();

        service.delete(&student, row.id).await.unwrap();
        let again = service.register(request("u1", "Valorant", 1)).await.unwrap();
        // receipts keep counting after a delete
        assert_eq!(again.receipt_number, "VEYG-2");
    }

    #[tokio::test]
    async fn test_receipt_clash_names_the_receipt() {
        let (store, service) = service();
        // one legacy row already holds the number the counter hands out next
        let mut legacy = request("legacy", "Chess", 1);
        legacy.team_leader.name = "Legacy".into();
        store
            .insert_unique(NewRegistration {
                user_id: legacy.user_id,
                game_id: legacy.game_id,
                game_name: legacy.game_name,
                game_day: GameDay::Day1,
                registration_type: legacy.registration_type,
                team_leader: legacy.team_leader,
                team_members: vec![],
                registration_id: "LEGACY-1".into(),
                receipt_number: "VEYG-2".into(),
                team_ids: vec![],
                total_fee_cents: 0,
            })
            .await
            .unwrap();

        let err = service.register(request("u1", "Valorant", 2)).await.unwrap_err();
        assert_eq!(err.to_string(), "receipt number VEYG-2 is already taken");
        assert!(matches!(err, RegistrationError::DuplicateReceiptNumber(ref receipt) if receipt == "VEYG-2"));
    }

    #[tokio::test]
    async fn test_store_outage_is_retryable() {
        let (store, service) = service();
        store.set_unavailable(true);
        let err = service.register(request("u1", "Chess", 1)).await.unwrap_err();
        assert!(err.is_retryable());
    }
}
