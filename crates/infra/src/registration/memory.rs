use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::types::Json;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::error::{StoreError, UniqueKey};
use super::store::{RegistrationFilter, RegistrationStore, StatusUpdate};
use crate::models::{ApprovalStatus, NewRegistration, PaymentStatus, RegistrationRow};
use crate::pagination::LimitOffset;

#[derive(Default)]
struct Inner {
    rows: Vec<RegistrationRow>,
    sequences: HashMap<String, i64>,
}

/// In-process [`RegistrationStore`] with the same uniqueness guarantees as the
/// Postgres repo. Every mutation runs under one write lock, so the
/// check-and-insert is atomic with respect to concurrent tasks.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
    unavailable: AtomicBool,
    latency_ms: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent call fail with [`StoreError::Unavailable`].
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Delays every subsequent call by `latency` before it touches the data.
    pub fn set_latency(&self, latency: Duration) {
        self.latency_ms.store(latency.as_millis() as u64, Ordering::SeqCst);
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.rows.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    async fn enter(&self) -> Result<(), StoreError> {
        let latency = self.latency_ms.load(Ordering::SeqCst);
        if latency > 0 {
            tokio::time::sleep(Duration::from_millis(latency)).await;
        }
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("memory store switched off".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl RegistrationStore for MemoryStore {
    async fn find_by_user_id(&self, user_id: &str) -> Result<Vec<RegistrationRow>, StoreError> {
        self.enter().await?;
        let inner = self.inner.read().await;
        Ok(inner.rows.iter().filter(|r| r.user_id == user_id).cloned().collect())
    }

    async fn count_where(&self, filter: &RegistrationFilter) -> Result<i64, StoreError> {
        self.enter().await?;
        let inner = self.inner.read().await;
        Ok(inner.rows.iter().filter(|r| filter.matches(r)).count() as i64)
    }

    async fn exists_by_registration_id(&self, registration_id: &str) -> Result<bool, StoreError> {
        self.enter().await?;
        let inner = self.inner.read().await;
        Ok(inner.rows.iter().any(|r| r.registration_id == registration_id))
    }

    async fn insert_unique(&self, record: NewRegistration) -> Result<RegistrationRow, StoreError> {
        self.enter().await?;
        let mut inner = self.inner.write().await;

        for row in &inner.rows {
            if row.user_id == record.user_id && row.game_day == record.game_day {
                return Err(StoreError::Duplicate(UniqueKey::UserDay));
            }
            if row.registration_id == record.registration_id {
                return Err(StoreError::Duplicate(UniqueKey::RegistrationId));
            }
            if row.receipt_number == record.receipt_number {
                return Err(StoreError::Duplicate(UniqueKey::ReceiptNumber));
            }
        }

        let now = Utc::now();
        let team_size = record.team_size();
        let row = RegistrationRow {
            id: Uuid::new_v4(),
            user_id: record.user_id,
            game_id: record.game_id,
            game_name: record.game_name,
            game_day: record.game_day,
            registration_type: record.registration_type,
            team_leader: Json(record.team_leader),
            team_members: Json(record.team_members),
            team_size,
            registration_id: record.registration_id,
            receipt_number: record.receipt_number,
            team_ids: Json(record.team_ids),
            approval_status: ApprovalStatus::Pending,
            payment_status: PaymentStatus::Pending,
            total_fee_cents: record.total_fee_cents,
            created_at: now,
            updated_at: now,
        };
        inner.rows.push(row.clone());
        Ok(row)
    }

    async fn next_sequence(&self, name: &str, floor: i64) -> Result<i64, StoreError> {
        self.enter().await?;
        let mut inner = self.inner.write().await;
        let value = inner.sequences.entry(name.to_string()).or_insert(0);
        *value = (*value).max(floor) + 1;
        Ok(*value)
    }

    async fn get(&self, id: Uuid) -> Result<Option<RegistrationRow>, StoreError> {
        self.enter().await?;
        let inner = self.inner.read().await;
        Ok(inner.rows.iter().find(|r| r.id == id).cloned())
    }

    async fn list(
        &self,
        filter: &RegistrationFilter,
        page: LimitOffset,
    ) -> Result<Vec<RegistrationRow>, StoreError> {
        self.enter().await?;
        let inner = self.inner.read().await;
        Ok(inner
            .rows
            .iter()
            .filter(|r| filter.matches(r))
            .skip(page.offset.max(0) as usize)
            .take(page.limit.max(0) as usize)
            .cloned()
            .collect())
    }

    async fn update_status(
        &self,
        id: Uuid,
        update: StatusUpdate,
    ) -> Result<Option<RegistrationRow>, StoreError> {
        self.enter().await?;
        let mut inner = self.inner.write().await;
        let Some(row) = inner.rows.iter_mut().find(|r| r.id == id) else {
            return Ok(None);
        };
        if let Some(status) = update.approval_status {
            row.approval_status = status;
        }
        if let Some(status) = update.payment_status {
            row.payment_status = status;
        }
        row.updated_at = Utc::now();
        Ok(Some(row.clone()))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        self.enter().await?;
        let mut inner = self.inner.write().await;
        let before = inner.rows.len();
        inner.rows.retain(|r| r.id != id);
        Ok(inner.rows.len() != before)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.enter().await
    }
}
