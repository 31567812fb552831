use serde::{de, Deserialize, Deserializer, Serialize};

use super::user::{DoctorProfile, Role, UserResponse};

/// Largest accepted years of experience.
pub const MAX_EXPERIENCE_YEARS: u32 = 100;

/// Body of `POST /api/auth/register`, discriminated by `role`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role")]
pub enum SignupPayload {
    Patient(AccountSignup),
    Doctor(DoctorSignup),
    Pharmacy(AccountSignup),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountSignup {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DoctorSignup {
    pub name: String,
    pub email: String,
    pub password: String,
    pub specialization: String,
    #[serde(deserialize_with = "whole_number")]
    pub experience: u32,
    pub qualifications: String,
    pub bio: String,
}

// Browsers post number inputs as text, so "7" is accepted as well as 7.
fn whole_number<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(u32),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(n) => Ok(n),
        Raw::Text(text) => text.trim().parse().map_err(|_| {
            de::Error::custom(format!("experience must be a whole number, got {text:?}"))
        }),
    }
}

impl SignupPayload {
    pub fn role(&self) -> Role {
        match self {
            SignupPayload::Patient(_) => Role::Patient,
            SignupPayload::Doctor(_) => Role::Doctor,
            SignupPayload::Pharmacy(_) => Role::Pharmacy,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            SignupPayload::Patient(a) | SignupPayload::Pharmacy(a) => &a.name,
            SignupPayload::Doctor(d) => &d.name,
        }
    }

    pub fn email(&self) -> &str {
        match self {
            SignupPayload::Patient(a) | SignupPayload::Pharmacy(a) => &a.email,
            SignupPayload::Doctor(d) => &d.email,
        }
    }

    pub fn password(&self) -> &str {
        match self {
            SignupPayload::Patient(a) | SignupPayload::Pharmacy(a) => &a.password,
            SignupPayload::Doctor(d) => &d.password,
        }
    }

    pub fn doctor_profile(&self) -> Option<DoctorProfile> {
        match self {
            SignupPayload::Doctor(d) => Some(DoctorProfile {
                specialization: d.specialization.trim().to_string(),
                experience: d.experience,
                qualifications: d.qualifications.trim().to_string(),
                bio: d.bio.trim().to_string(),
            }),
            _ => None,
        }
    }

    /// Server-side presence checks; returns the first problem found.
    pub fn validate(&self) -> Result<(), String> {
        let mut required = vec![
            ("name", self.name()),
            ("email", self.email()),
            ("password", self.password()),
        ];
        if let SignupPayload::Doctor(d) = self {
            required.push(("specialization", d.specialization.as_str()));
            required.push(("qualifications", d.qualifications.as_str()));
            required.push(("bio", d.bio.as_str()));
        }

        if let Some((field, _)) = required.iter().find(|(_, v)| v.trim().is_empty()) {
            return Err(format!("{field} is required"));
        }
        if !looks_like_email(self.email()) {
            return Err("email is invalid".to_string());
        }
        if let SignupPayload::Doctor(d) = self {
            if d.experience > MAX_EXPERIENCE_YEARS {
                return Err("experience is out of range".to_string());
            }
        }
        Ok(())
    }
}

/// Same shape check a browser applies to `type=email` inputs.
pub fn looks_like_email(value: &str) -> bool {
    let value = value.trim();
    match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !value.chars().any(char::is_whitespace)
        }
        None => false,
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserResponse,
}
