use async_trait::async_trait;
use sqlx::types::Json;
use uuid::Uuid;

use crate::{
    db::Db,
    models::{NewRegistration, RegistrationRow},
    pagination::LimitOffset,
    registration::{RegistrationFilter, RegistrationStore, StatusUpdate, StoreError, UniqueKey},
};

const COLUMNS: &str = r#"
    id, user_id, game_id, game_name, game_day, registration_type,
    team_leader, team_members, team_size, registration_id, receipt_number,
    team_ids, approval_status, payment_status, total_fee_cents, created_at, updated_at
"#;

// Shared WHERE clause for count/list, binds $1..$6.
const FILTER: &str = r#"
    WHERE ($1::text IS NULL OR user_id = $1)
      AND ($2::text IS NULL OR game_name = $2)
      AND ($3::text IS NULL OR strpos(lower(team_leader->>'college'), lower($3)) > 0)
      AND ($4::game_day IS NULL OR game_day = $4)
      AND ($5::approval_status IS NULL OR approval_status = $5)
      AND ($6::payment_status IS NULL OR payment_status = $6)
"#;

/// Postgres-backed [`RegistrationStore`]. Uniqueness is enforced by the
/// constraints in the registrations migration.
#[derive(Clone)]
pub struct RegistrationRepo {
    pool: Db,
}

impl RegistrationRepo {
    pub fn new(pool: Db) -> Self {
        Self { pool }
    }
}

fn insert_error(e: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db) = &e {
        if db.is_unique_violation() {
            if let Some(key) = db.constraint().and_then(UniqueKey::from_constraint) {
                return StoreError::Duplicate(key);
            }
        }
    }
    StoreError::Db(e)
}

#[async_trait]
impl RegistrationStore for RegistrationRepo {
    async fn find_by_user_id(&self, user_id: &str) -> Result<Vec<RegistrationRow>, StoreError> {
        let rows = sqlx::query_as::<_, RegistrationRow>(&format!(
            "SELECT {COLUMNS} FROM registrations WHERE user_id = $1 ORDER BY created_at ASC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn count_where(&self, filter: &RegistrationFilter) -> Result<i64, StoreError> {
        let count: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM registrations {FILTER}"))
            .bind(filter.user_id.as_deref())
            .bind(filter.game_name.as_deref())
            .bind(filter.college_contains.as_deref().map(str::trim))
            .bind(filter.game_day)
            .bind(filter.approval_status)
            .bind(filter.payment_status)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    async fn exists_by_registration_id(&self, registration_id: &str) -> Result<bool, StoreError> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM registrations WHERE registration_id = $1)",
        )
        .bind(registration_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn insert_unique(&self, record: NewRegistration) -> Result<RegistrationRow, StoreError> {
        let team_size = record.team_size();
        sqlx::query_as::<_, RegistrationRow>(&format!(
            r#"
            INSERT INTO registrations (
                id, user_id, game_id, game_name, game_day, registration_type,
                team_leader, team_members, team_size, registration_id, receipt_number,
                team_ids, total_fee_cents
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING {COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(record.user_id)
        .bind(record.game_id)
        .bind(record.game_name)
        .bind(record.game_day)
        .bind(record.registration_type)
        .bind(Json(record.team_leader))
        .bind(Json(record.team_members))
        .bind(team_size)
        .bind(record.registration_id)
        .bind(record.receipt_number)
        .bind(Json(record.team_ids))
        .bind(record.total_fee_cents)
        .fetch_one(&self.pool)
        .await
        .map_err(insert_error)
    }

    async fn next_sequence(&self, name: &str, floor: i64) -> Result<i64, StoreError> {
        let value: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO registration_sequences (name, value)
            VALUES ($1, $2::bigint + 1)
            ON CONFLICT (name) DO UPDATE
                SET value = GREATEST(registration_sequences.value, $2::bigint) + 1
            RETURNING value
            "#,
        )
        .bind(name)
        .bind(floor)
        .fetch_one(&self.pool)
        .await?;

        Ok(value)
    }

    async fn get(&self, id: Uuid) -> Result<Option<RegistrationRow>, StoreError> {
        let row = sqlx::query_as::<_, RegistrationRow>(&format!(
            "SELECT {COLUMNS} FROM registrations WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn list(
        &self,
        filter: &RegistrationFilter,
        page: LimitOffset,
    ) -> Result<Vec<RegistrationRow>, StoreError> {
        let rows = sqlx::query_as::<_, RegistrationRow>(&format!(
            "SELECT {COLUMNS} FROM registrations {FILTER} ORDER BY created_at ASC LIMIT $7 OFFSET $8"
        ))
        .bind(filter.user_id.as_deref())
        .bind(filter.game_name.as_deref())
        .bind(filter.college_contains.as_deref().map(str::trim))
        .bind(filter.game_day)
        .bind(filter.approval_status)
        .bind(filter.payment_status)
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn update_status(
        &self,
        id: Uuid,
        update: StatusUpdate,
    ) -> Result<Option<RegistrationRow>, StoreError> {
        let row = sqlx::query_as::<_, RegistrationRow>(&format!(
            r#"
            UPDATE registrations
            SET approval_status = COALESCE($2, approval_status),
                payment_status = COALESCE($3, payment_status),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {COLUMNS}
            "#
        ))
        .bind(id)
        .bind(update.approval_status)
        .bind(update.payment_status)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM registrations WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        crate::db::ping(&self.pool).await?;
        Ok(())
    }
}
