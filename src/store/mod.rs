use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

pub mod memory;
pub mod postgres;
mod types;

pub use memory::MemoryStore;
pub use postgres::PostgresStore;
pub use types::{
    Incident, IncidentPatch, IncidentWithReporter, NewIncident, NewUser, ReporterInfo, Role, User,
    UserPatch,
};

/// Persistence failure surfaced to handlers. Unique-constraint violations
/// carry the offending field name so the API can answer 400 instead of 500.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("duplicate value for unique field `{0}`")]
    Duplicate(&'static str),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Persistence port for users and incidents. Handlers only see this trait;
/// the binary wires in [`PostgresStore`], tests wire in [`MemoryStore`].
///
/// Inserts and updates are atomic: uniqueness is decided by the store's own
/// constraints, and a concurrent duplicate loses at write time with
/// [`StoreError::Duplicate`].
#[async_trait]
pub trait FleetStore: Send + Sync {
    async fn create_user(&self, new: NewUser) -> Result<User, StoreError>;
    async fn user_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;
    async fn user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
    async fn list_users(&self) -> Result<Vec<User>, StoreError>;
    /// Applies the patch and returns the updated record, `None` if the user
    /// does not exist.
    async fn update_user(&self, id: Uuid, patch: UserPatch) -> Result<Option<User>, StoreError>;
    /// Returns whether a record was deleted. Owned incidents go with it.
    async fn delete_user(&self, id: Uuid) -> Result<bool, StoreError>;

    async fn create_incident(&self, new: NewIncident) -> Result<Incident, StoreError>;
    async fn incident_by_id(&self, id: Uuid) -> Result<Option<Incident>, StoreError>;
    async fn incident_with_reporter(
        &self,
        id: Uuid,
    ) -> Result<Option<IncidentWithReporter>, StoreError>;
    /// Every incident with its reporter, for admin listings.
    async fn list_incidents(&self) -> Result<Vec<IncidentWithReporter>, StoreError>;
    async fn list_incidents_by_owner(&self, user_id: Uuid) -> Result<Vec<Incident>, StoreError>;
    async fn update_incident(
        &self,
        id: Uuid,
        patch: IncidentPatch,
    ) -> Result<Option<Incident>, StoreError>;
    async fn delete_incident(&self, id: Uuid) -> Result<bool, StoreError>;
}
