use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use super::{
    FleetStore, Incident, IncidentPatch, IncidentWithReporter, NewIncident, NewUser, ReporterInfo,
    StoreError, User, UserPatch,
};

/// Postgres-backed store. Uniqueness lives in the schema (`users_email_key`,
/// `users_registration_number_key`), so concurrent duplicates are rejected at
/// write time rather than by a racy pre-check.
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Maps a unique-constraint violation to the offending API field name.
fn map_write_error(e: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(ref db) = e {
        if db.kind() == sqlx::error::ErrorKind::UniqueViolation {
            let field = match db.constraint() {
                Some("users_email_key") => "email",
                Some("users_registration_number_key") => "registrationNumber",
                _ => "unknown field",
            };
            return StoreError::Duplicate(field);
        }
    }
    StoreError::Database(e)
}

/// Flattened row for the incidents ⋈ users join.
#[derive(FromRow)]
struct IncidentReporterRow {
    id: Uuid,
    description: String,
    date: OffsetDateTime,
    user_id: Uuid,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
    reporter_name: String,
    reporter_email: String,
    reporter_registration_number: Option<String>,
    reporter_car_brand: Option<String>,
    reporter_car_model: Option<String>,
}

impl From<IncidentReporterRow> for IncidentWithReporter {
    fn from(row: IncidentReporterRow) -> Self {
        IncidentWithReporter {
            user: ReporterInfo {
                id: row.user_id,
                name: row.reporter_name,
                email: row.reporter_email,
                registration_number: row.reporter_registration_number,
                car_brand: row.reporter_car_brand,
                car_model: row.reporter_car_model,
            },
            incident: Incident {
                id: row.id,
                description: row.description,
                date: row.date,
                user_id: row.user_id,
                created_at: row.created_at,
                updated_at: row.updated_at,
            },
        }
    }
}

const INCIDENT_REPORTER_SELECT: &str = r#"
    SELECT i.id, i.description, i.date, i.user_id, i.created_at, i.updated_at,
           u.name AS reporter_name,
           u.email AS reporter_email,
           u.registration_number AS reporter_registration_number,
           u.car_brand AS reporter_car_brand,
           u.car_model AS reporter_car_model
    FROM incidents i
    JOIN users u ON u.id = i.user_id
"#;

#[async_trait]
impl FleetStore for PostgresStore {
    async fn create_user(&self, new: NewUser) -> Result<User, StoreError> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, name, email, password_hash, role,
                               registration_number, car_brand, car_model, delivery_date)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id, name, email, password_hash, role, registration_number,
                      car_brand, car_model, delivery_date, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(new.name)
        .bind(new.email)
        .bind(new.password_hash)
        .bind(new.role)
        .bind(new.registration_number)
        .bind(new.car_brand)
        .bind(new.car_model)
        .bind(new.delivery_date)
        .fetch_one(&self.pool)
        .await
        .map_err(map_write_error)
    }

    async fn user_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, password_hash, role, registration_number,
                   car_brand, car_model, delivery_date, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, password_hash, role, registration_number,
                   car_brand, car_model, delivery_date, created_at, updated_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, password_hash, role, registration_number,
                   car_brand, car_model, delivery_date, created_at, updated_at
            FROM users
            ORDER BY created_at ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }

    async fn update_user(&self, id: Uuid, patch: UserPatch) -> Result<Option<User>, StoreError> {
        sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET name = COALESCE($2, name),
                email = COALESCE($3, email),
                password_hash = COALESCE($4, password_hash),
                role = COALESCE($5, role),
                registration_number = COALESCE($6, registration_number),
                car_brand = COALESCE($7, car_brand),
                car_model = COALESCE($8, car_model),
                delivery_date = COALESCE($9, delivery_date),
                updated_at = now()
            WHERE id = $1
            RETURNING id, name, email, password_hash, role, registration_number,
                      car_brand, car_model, delivery_date, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(patch.name)
        .bind(patch.email)
        .bind(patch.password_hash)
        .bind(patch.role)
        .bind(patch.registration_number)
        .bind(patch.car_brand)
        .bind(patch.car_model)
        .bind(patch.delivery_date)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_write_error)
    }

    async fn delete_user(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn create_incident(&self, new: NewIncident) -> Result<Incident, StoreError> {
        let incident = sqlx::query_as::<_, Incident>(
            r#"
            INSERT INTO incidents (id, description, date, user_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id, description, date, user_id, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(new.description)
        .bind(new.date)
        .bind(new.user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(incident)
    }

    async fn incident_by_id(&self, id: Uuid) -> Result<Option<Incident>, StoreError> {
        let incident = sqlx::query_as::<_, Incident>(
            r#"
            SELECT id, description, date, user_id, created_at, updated_at
            FROM incidents
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(incident)
    }

    async fn incident_with_reporter(
        &self,
        id: Uuid,
    ) -> Result<Option<IncidentWithReporter>, StoreError> {
        let query = format!("{INCIDENT_REPORTER_SELECT} WHERE i.id = $1");
        let row = sqlx::query_as::<_, IncidentReporterRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Into::into))
    }

    async fn list_incidents(&self) -> Result<Vec<IncidentWithReporter>, StoreError> {
        let query = format!("{INCIDENT_REPORTER_SELECT} ORDER BY i.date DESC");
        let rows = sqlx::query_as::<_, IncidentReporterRow>(&query)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn list_incidents_by_owner(&self, user_id: Uuid) -> Result<Vec<Incident>, StoreError> {
        let incidents = sqlx::query_as::<_, Incident>(
            r#"
            SELECT id, description, date, user_id, created_at, updated_at
            FROM incidents
            WHERE user_id = $1
            ORDER BY date DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(incidents)
    }

    async fn update_incident(
        &self,
        id: Uuid,
        patch: IncidentPatch,
    ) -> Result<Option<Incident>, StoreError> {
        let incident = sqlx::query_as::<_, Incident>(
            r#"
            UPDATE incidents
            SET description = COALESCE($2, description),
                date = COALESCE($3, date),
                updated_at = now()
            WHERE id = $1
            RETURNING id, description, date, user_id, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(patch.description)
        .bind(patch.date)
        .fetch_optional(&self.pool)
        .await?;
        Ok(incident)
    }

    async fn delete_incident(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM incidents WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
