use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use super::{normalize_email, PatientStore, StoreError, UserStore};
use crate::model::patient::{NewPatient, Patient, PatientUpdate};
use crate::model::user::{DoctorProfile, NewUser, User};

const SCHEMA: [&str; 3] = [
    "CREATE TABLE IF NOT EXISTS users (
        id UUID PRIMARY KEY,
        name TEXT NOT NULL,
        email TEXT NOT NULL UNIQUE,
        role TEXT NOT NULL,
        password_hash TEXT NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )",
    "CREATE TABLE IF NOT EXISTS doctor_profiles (
        user_id UUID PRIMARY KEY REFERENCES users(id) ON DELETE CASCADE,
        specialization TEXT NOT NULL,
        experience INTEGER NOT NULL CHECK (experience >= 0),
        qualifications TEXT NOT NULL,
        bio TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS patients (
        id UUID PRIMARY KEY,
        name TEXT NOT NULL,
        age INTEGER NOT NULL,
        gender TEXT NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )",
];

const SELECT_USER: &str = "SELECT u.id, u.name, u.email, u.role, u.password_hash, u.created_at,
        d.specialization, d.experience, d.qualifications, d.bio
    FROM users u LEFT JOIN doctor_profiles d ON d.user_id = u.id";

#[derive(Debug, FromRow)]
struct UserRow {
    id: Uuid,
    name: String,
    email: String,
    role: String,
    password_hash: String,
    created_at: DateTime<Utc>,
    specialization: Option<String>,
    experience: Option<i32>,
    qualifications: Option<String>,
    bio: Option<String>,
}

impl TryFrom<UserRow> for User {
    type Error = StoreError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let role = row
            .role
            .parse()
            .map_err(|e| StoreError::Corrupt(format!("user {}: {e}", row.id)))?;
        let doctor = match (row.specialization, row.experience, row.qualifications, row.bio) {
            (Some(specialization), Some(experience), Some(qualifications), Some(bio)) => {
                Some(DoctorProfile {
                    specialization,
                    experience: u32::try_from(experience).map_err(|_| {
                        StoreError::Corrupt(format!("user {}: negative experience", row.id))
                    })?,
                    qualifications,
                    bio,
                })
            }
            _ => None,
        };
        Ok(User {
            id: row.id,
            name: row.name,
            email: row.email,
            role,
            password_hash: row.password_hash,
            doctor,
            created_at: row.created_at,
        })
    }
}

fn map_insert_error(e: sqlx::Error) -> StoreError {
    match &e {
        sqlx::Error::Database(db) if db.code().as_deref() == Some("23505") => StoreError::Conflict,
        _ => StoreError::Database(e),
    }
}

#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates the tables if they are missing.
    pub async fn init_schema(&self) -> Result<(), StoreError> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn insert_user(&self, user: NewUser) -> Result<User, StoreError> {
        let id = Uuid::new_v4();
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO users (id, name, email, role, password_hash) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(id)
        .bind(&user.name)
        .bind(normalize_email(&user.email))
        .bind(user.role.as_str())
        .bind(&user.password_hash)
        .execute(&mut tx)
        .await
        .map_err(map_insert_error)?;

        if let Some(doctor) = &user.doctor {
            let experience = i32::try_from(doctor.experience)
                .map_err(|_| StoreError::Corrupt("experience out of range".to_string()))?;
            sqlx::query(
                "INSERT INTO doctor_profiles (user_id, specialization, experience, qualifications, bio)
                 VALUES ($1, $2, $3, $4, $5)",
            )
            .bind(id)
            .bind(&doctor.specialization)
            .bind(experience)
            .bind(&doctor.qualifications)
            .bind(&doctor.bio)
            .execute(&mut tx)
            .await?;
        }

        let row: UserRow = sqlx::query_as(&format!("{SELECT_USER} WHERE u.id = $1"))
            .bind(id)
            .fetch_one(&mut tx)
            .await?;
        tx.commit().await?;

        User::try_from(row)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let row: Option<UserRow> = sqlx::query_as(&format!("{SELECT_USER} WHERE u.email = $1"))
            .bind(normalize_email(email))
            .fetch_optional(&self.pool)
            .await?;
        row.map(User::try_from).transpose()
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let row: Option<UserRow> = sqlx::query_as(&format!("{SELECT_USER} WHERE u.id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(User::try_from).transpose()
    }
}

#[async_trait]
impl PatientStore for PgStore {
    async fn insert_patient(&self, patient: NewPatient) -> Result<Patient, StoreError> {
        let row = sqlx::query_as::<_, Patient>(
            "INSERT INTO patients (id, name, age, gender) VALUES ($1, $2, $3, $4)
             RETURNING id, name, age, gender, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(patient.name)
        .bind(patient.age)
        .bind(patient.gender)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn list_patients(&self) -> Result<Vec<Patient>, StoreError> {
        let rows = sqlx::query_as::<_, Patient>(
            "SELECT id, name, age, gender, created_at FROM patients ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn get_patient(&self, id: Uuid) -> Result<Option<Patient>, StoreError> {
        let row = sqlx::query_as::<_, Patient>(
            "SELECT id, name, age, gender, created_at FROM patients WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn update_patient(
        &self,
        id: Uuid,
        update: PatientUpdate,
    ) -> Result<Option<Patient>, StoreError> {
        let row = sqlx::query_as::<_, Patient>(
            "UPDATE patients SET
                name = COALESCE($2, name),
                age = COALESCE($3, age),
                gender = COALESCE($4, gender)
             WHERE id = $1
             RETURNING id, name, age, gender, created_at",
        )
        .bind(id)
        .bind(update.name)
        .bind(update.age)
        .bind(update.gender)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn delete_patient(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM patients WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
