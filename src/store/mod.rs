use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::model::patient::{NewPatient, Patient, PatientUpdate};
use crate::model::user::{NewUser, User};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database operation failed: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Record already exists")]
    Conflict,

    #[error("Corrupt row: {0}")]
    Corrupt(String),
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Fails with [`StoreError::Conflict`] when the email is taken.
    async fn insert_user(&self, user: NewUser) -> Result<User, StoreError>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
    async fn find_user(&self, id: Uuid) -> Result<Option<User>, StoreError>;
}

#[async_trait]
pub trait PatientStore: Send + Sync {
    async fn insert_patient(&self, patient: NewPatient) -> Result<Patient, StoreError>;
    async fn list_patients(&self) -> Result<Vec<Patient>, StoreError>;
    async fn get_patient(&self, id: Uuid) -> Result<Option<Patient>, StoreError>;
    async fn update_patient(
        &self,
        id: Uuid,
        update: PatientUpdate,
    ) -> Result<Option<Patient>, StoreError>;
    /// Returns whether a record was removed.
    async fn delete_patient(&self, id: Uuid) -> Result<bool, StoreError>;
}

// Emails are unique regardless of case.
pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
