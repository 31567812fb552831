use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{normalize_email, PatientStore, StoreError, UserStore};
use crate::model::patient::{NewPatient, Patient, PatientUpdate};
use crate::model::user::{NewUser, User};

/// Process-local store used by tests and local demos.
#[derive(Debug, Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<Uuid, User>>,
    patients: RwLock<Vec<Patient>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn insert_user(&self, user: NewUser) -> Result<User, StoreError> {
        let email = normalize_email(&user.email);
        let mut users = self.users.write().await;
        if users.values().any(|u| u.email == email) {
            return Err(StoreError::Conflict);
        }
        let user = User {
            id: Uuid::new_v4(),
            name: user.name,
            email,
            role: user.role,
            password_hash: user.password_hash,
            doctor: user.doctor,
            created_at: Utc::now(),
        };
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let email = normalize_email(email);
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self.users.read().await.get(&id).cloned())
    }
}

#[async_trait]
impl PatientStore for MemoryStore {
    async fn insert_patient(&self, patient: NewPatient) -> Result<Patient, StoreError> {
        let patient = Patient {
            id: Uuid::new_v4(),
            name: patient.name,
            age: patient.age,
            gender: patient.gender,
            created_at: Utc::now(),
        };
        self.patients.write().await.push(patient.clone());
        Ok(patient)
    }

    async fn list_patients(&self) -> Result<Vec<Patient>, StoreError> {
        let mut patients = self.patients.read().await.clone();
        patients.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(patients)
    }

    async fn get_patient(&self, id: Uuid) -> Result<Option<Patient>, StoreError> {
        let patients = self.patients.read().await;
        Ok(patients.iter().find(|p| p.id == id).cloned())
    }

    async fn update_patient(
        &self,
        id: Uuid,
        update: PatientUpdate,
    ) -> Result<Option<Patient>, StoreError> {
        let mut patients = self.patients.write().await;
        Ok(patients.iter_mut().find(|p| p.id == id).map(|patient| {
            update.apply(patient);
            patient.clone()
        }))
    }

    async fn delete_patient(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut patients = self.patients.write().await;
        let before = patients.len();
        patients.retain(|p| p.id != id);
        Ok(patients.len() != before)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::user::Role;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            name: "Ada".into(),
            email: email.into(),
            role: Role::Patient,
            password_hash: "hash".into(),
            doctor: None,
        }
    }

    #[tokio::test]
    async fn duplicate_email_conflicts_case_insensitively() {
        let store = MemoryStore::new();
        store.insert_user(new_user("Ada@Example.com")).await.unwrap();
        let err = store.insert_user(new_user("ada@example.com")).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict));
        assert!(store
            .find_user_by_email(" ADA@example.com ")
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn patient_crud() {
        let store = MemoryStore::new();
        let created = store
            .insert_patient(NewPatient {
                name: "Grace".into(),
                age: 30,
                gender: "female".into(),
            })
            .await
            .unwrap();

        let updated = store
            .update_patient(
                created.id,
                PatientUpdate {
                    age: Some(31),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.age, 31);
        assert_eq!(updated.created_at, created.created_at);

        assert_eq!(store.list_patients().await.unwrap().len(), 1);
        assert!(store.delete_patient(created.id).await.unwrap());
        assert!(!store.delete_patient(created.id).await.unwrap());
        assert!(store.get_patient(created.id).await.unwrap().is_none());
    }
}
