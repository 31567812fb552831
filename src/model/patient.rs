use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    pub id: Uuid,
    pub name: String,
    pub age: i32,
    pub gender: String,
    pub created_at: DateTime<Utc>,
}

// Request body for creating a patient; every field is optional here so a
// missing one is reported as a validation failure instead of a parse error.
#[derive(Debug, Default, Deserialize)]
pub struct CreatePatientRequest {
    pub name: Option<String>,
    pub age: Option<i32>,
    pub gender: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdatePatientRequest {
    pub name: Option<String>,
    pub age: Option<i32>,
    pub gender: Option<String>,
}

/// A patient that passed validation and may be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPatient {
    pub name: String,
    pub age: i32,
    pub gender: String,
}

/// A validated partial update. `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatientUpdate {
    pub name: Option<String>,
    pub age: Option<i32>,
    pub gender: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Patient validation failed: {}", .problems.join(", "))]
pub struct PatientValidationError {
    pub problems: Vec<String>,
}

fn required_text(field: &str, value: Option<String>, problems: &mut Vec<String>) -> Option<String> {
    match value.map(|v| v.trim().to_string()) {
        Some(v) if !v.is_empty() => Some(v),
        _ => {
            problems.push(format!("{field} is required"));
            None
        }
    }
}

fn check_age(age: i32, problems: &mut Vec<String>) -> Option<i32> {
    if age < 0 {
        problems.push("age must not be negative".to_string());
        None
    } else {
        Some(age)
    }
}

impl CreatePatientRequest {
    pub fn validate(self) -> Result<NewPatient, PatientValidationError> {
        let mut problems = Vec::new();
        let name = required_text("name", self.name, &mut problems);
        let age = match self.age {
            Some(age) => check_age(age, &mut problems),
            None => {
                problems.push("age is required".to_string());
                None
            }
        };
        let gender = required_text("gender", self.gender, &mut problems);

        match (name, age, gender) {
            (Some(name), Some(age), Some(gender)) if problems.is_empty() => {
                Ok(NewPatient { name, age, gender })
            }
            _ => Err(PatientValidationError { problems }),
        }
    }
}

impl UpdatePatientRequest {
    pub fn validate(self) -> Result<PatientUpdate, PatientValidationError> {
        let mut problems = Vec::new();
        let name = match self.name {
            Some(name) => required_text("name", Some(name), &mut problems),
            None => None,
        };
        let age = self.age.and_then(|age| check_age(age, &mut problems));
        let gender = match self.gender {
            Some(gender) => required_text("gender", Some(gender), &mut problems),
            None => None,
        };

        if problems.is_empty() {
            Ok(PatientUpdate { name, age, gender })
        } else {
            Err(PatientValidationError { problems })
        }
    }
}

impl PatientUpdate {
    pub fn apply(&self, patient: &mut Patient) {
        if let Some(name) = &self.name {
            patient.name = name.clone();
        }
        if let Some(age) = self.age {
            patient.age = age;
        }
        if let Some(gender) = &self.gender {
            patient.gender = gender.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_requires_every_field() {
        let err = CreatePatientRequest::default().validate().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Patient validation failed: name is required, age is required, gender is required"
        );
    }

    #[test]
    fn create_trims_text_fields() {
        let patient = CreatePatientRequest {
            name: Some("  Grace Hopper ".into()),
            age: Some(85),
            gender: Some("female".into()),
        }
        .validate()
        .unwrap();
        assert_eq!(patient.name, "Grace Hopper");
        assert_eq!(patient.age, 85);
    }

    #[test]
    fn blank_name_is_missing() {
        let err = CreatePatientRequest {
            name: Some("   ".into()),
            age: Some(3),
            gender: Some("male".into()),
        }
        .validate()
        .unwrap_err();
        assert_eq!(err.problems, vec!["name is required".to_string()]);
    }

    #[test]
    fn negative_age_is_rejected() {
        let err = CreatePatientRequest {
            name: Some("Kid".into()),
            age: Some(-1),
            gender: Some("male".into()),
        }
        .validate()
        .unwrap_err();
        assert_eq!(err.problems, vec!["age must not be negative".to_string()]);
    }

    #[test]
    fn update_rejects_present_but_empty_fields() {
        let err = UpdatePatientRequest {
            gender: Some(String::new()),
            ..Default::default()
        }
        .validate()
        .unwrap_err();
        assert_eq!(err.problems, vec!["gender is required".to_string()]);
    }

    #[test]
    fn update_applies_only_given_fields() {
        let created_at = Utc::now();
        let mut patient = Patient {
            id: Uuid::new_v4(),
            name: "Old".into(),
            age: 40,
            gender: "male".into(),
            created_at,
        };
        let update = UpdatePatientRequest {
            age: Some(41),
            ..Default::default()
        }
        .validate()
        .unwrap();
        update.apply(&mut patient);
        assert_eq!(patient.name, "Old");
        assert_eq!(patient.age, 41);
        assert_eq!(patient.created_at, created_at);
    }

    #[test]
    fn serializes_created_at_in_camel_case() {
        let patient = Patient {
            id: Uuid::nil(),
            name: "A".into(),
            age: 1,
            gender: "x".into(),
            created_at: Utc::now(),
        };
        let json = serde_json::to_value(&patient).unwrap();
        assert!(json.get("createdAt").is_some());
        assert!(json.get("created_at").is_none());
    }
}
