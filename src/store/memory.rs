use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use super::{
    FleetStore, Incident, IncidentPatch, IncidentWithReporter, NewIncident, NewUser, StoreError,
    User, UserPatch,
};

/// In-memory [`FleetStore`] with the same uniqueness and cascade semantics as
/// the Postgres schema. Backs the integration tests; no database required.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    users: HashMap<Uuid, User>,
    incidents: HashMap<Uuid, Incident>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Inner {
    /// Duplicate check against every record except `exclude`, mirroring the
    /// unique constraints on the users table.
    fn check_unique(
        &self,
        email: Option<&str>,
        registration_number: Option<&str>,
        exclude: Option<Uuid>,
    ) -> Result<(), StoreError> {
        for user in self.users.values() {
            if Some(user.id) == exclude {
                continue;
            }
            if email.is_some_and(|e| e == user.email) {
                return Err(StoreError::Duplicate("email"));
            }
            if registration_number.is_some() && registration_number == user.registration_number.as_deref() {
                return Err(StoreError::Duplicate("registrationNumber"));
            }
        }
        Ok(())
    }
}

#[async_trait]
impl FleetStore for MemoryStore {
    async fn create_user(&self, new: NewUser) -> Result<User, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        inner.check_unique(Some(&new.email), new.registration_number.as_deref(), None)?;

        let now = OffsetDateTime::now_utc();
        let user = User {
            id: Uuid::new_v4(),
            name: new.name,
            email: new.email,
            password_hash: new.password_hash,
            role: new.role,
            registration_number: new.registration_number,
            car_brand: new.car_brand,
            car_model: new.car_model,
            delivery_date: new.delivery_date,
            created_at: now,
            updated_at: now,
        };
        inner.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn user_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self.inner.lock().unwrap().users.get(&id).cloned())
    }

    async fn user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.users.values().find(|u| u.email == email).cloned())
    }

    async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        let inner = self.inner.lock().unwrap();
        let mut users: Vec<User> = inner.users.values().cloned().collect();
        users.sort_by_key(|u| u.created_at);
        Ok(users)
    }

    async fn update_user(&self, id: Uuid, patch: UserPatch) -> Result<Option<User>, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        if !inner.users.contains_key(&id) {
            return Ok(None);
        }
        inner.check_unique(
            patch.email.as_deref(),
            patch.registration_number.as_deref(),
            Some(id),
        )?;

        let user = inner.users.get_mut(&id).unwrap();
        if let Some(name) = patch.name {
            user.name = name;
        }
        if let Some(email) = patch.email {
            user.email = email;
        }
        if let Some(password_hash) = patch.password_hash {
            user.password_hash = password_hash;
        }
        if let Some(role) = patch.role {
            user.role = role;
        }
        if let Some(registration_number) = patch.registration_number {
            user.registration_number = Some(registration_number);
        }
        if let Some(car_brand) = patch.car_brand {
            user.car_brand = Some(car_brand);
        }
        if let Some(car_model) = patch.car_model {
            user.car_model = Some(car_model);
        }
        if let Some(delivery_date) = patch.delivery_date {
            user.delivery_date = Some(delivery_date);
        }
        user.updated_at = OffsetDateTime::now_utc();
        Ok(Some(user.clone()))
    }

    async fn delete_user(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let removed = inner.users.remove(&id).is_some();
        if removed {
            inner.incidents.retain(|_, i| i.user_id != id);
        }
        Ok(removed)
    }

    async fn create_incident(&self, new: NewIncident) -> Result<Incident, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let now = OffsetDateTime::now_utc();
        let incident = Incident {
            id: Uuid::new_v4(),
            description: new.description,
            date: new.date,
            user_id: new.user_id,
            created_at: now,
            updated_at: now,
        };
        inner.incidents.insert(incident.id, incident.clone());
        Ok(incident)
    }

    async fn incident_by_id(&self, id: Uuid) -> Result<Option<Incident>, StoreError> {
        Ok(self.inner.lock().unwrap().incidents.get(&id).cloned())
    }

    async fn incident_with_reporter(
        &self,
        id: Uuid,
    ) -> Result<Option<IncidentWithReporter>, StoreError> {
        let inner = self.inner.lock().unwrap();
        let Some(incident) = inner.incidents.get(&id) else {
            return Ok(None);
        };
        let Some(reporter) = inner.users.get(&incident.user_id) else {
            return Ok(None);
        };
        Ok(Some(IncidentWithReporter {
            incident: incident.clone(),
            user: reporter.into(),
        }))
    }

    async fn list_incidents(&self) -> Result<Vec<IncidentWithReporter>, StoreError> {
        let inner = self.inner.lock().unwrap();
        let mut rows: Vec<IncidentWithReporter> = inner
            .incidents
            .values()
            .filter_map(|incident| {
                inner.users.get(&incident.user_id).map(|reporter| IncidentWithReporter {
                    incident: incident.clone(),
                    user: reporter.into(),
                })
            })
            .collect();
        rows.sort_by(|a, b| b.incident.date.cmp(&a.incident.date));
        Ok(rows)
    }

    async fn list_incidents_by_owner(&self, user_id: Uuid) -> Result<Vec<Incident>, StoreError> {
        let inner = self.inner.lock().unwrap();
        let mut incidents: Vec<Incident> = inner
            .incidents
            .values()
            .filter(|i| i.user_id == user_id)
            .cloned()
            .collect();
        incidents.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(incidents)
    }

    async fn update_incident(
        &self,
        id: Uuid,
        patch: IncidentPatch,
    ) -> Result<Option<Incident>, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let Some(incident) = inner.incidents.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(description) = patch.description {
            incident.description = description;
        }
        if let Some(date) = patch.date {
            incident.date = date;
        }
        incident.updated_at = OffsetDateTime::now_utc();
        Ok(Some(incident.clone()))
    }

    async fn delete_incident(&self, id: Uuid) -> Result<bool, StoreError> {
        Ok(self.inner.lock().unwrap().incidents.remove(&id).is_some())
    }
}
