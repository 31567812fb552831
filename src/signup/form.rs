use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::model::signup::{
    looks_like_email, AccountSignup, DoctorSignup, SignupPayload, MAX_EXPERIENCE_YEARS,
};
use crate::model::user::Role;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Name,
    Email,
    Password,
    Role,
    Specialization,
    Experience,
    Qualifications,
    Bio,
}

impl Field {
    pub const BASE: [Field; 4] = [Field::Name, Field::Email, Field::Password, Field::Role];
    pub const DOCTOR: [Field; 4] = [
        Field::Specialization,
        Field::Experience,
        Field::Qualifications,
        Field::Bio,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Email => "email",
            Field::Password => "password",
            Field::Role => "role",
            Field::Specialization => "specialization",
            Field::Experience => "experience",
            Field::Qualifications => "qualifications",
            Field::Bio => "bio",
        }
    }

    /// Prompt text shown next to the input.
    pub fn placeholder(&self) -> &'static str {
        match self {
            Field::Name => "Name",
            Field::Email => "Email",
            Field::Password => "Password",
            Field::Role => "Role (Patient, Doctor, Pharmacy)",
            Field::Specialization => "Specialization (e.g. Cardiologist)",
            Field::Experience => "Years of Experience",
            Field::Qualifications => "Qualifications (e.g. MBBS, MD)",
            Field::Bio => "Short Bio",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Field {
    type Err = FormError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Field::BASE
            .into_iter()
            .chain(Field::DOCTOR)
            .find(|field| field.as_str() == s)
            .ok_or_else(|| FormError::UnknownField(s.to_string()))
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    #[error("unknown form field: {0}")]
    UnknownField(String),

    #[error("unknown role: {0}")]
    UnknownRole(String),

    #[error("Please fill out the {0} field.")]
    Required(Field),

    #[error("Please enter a valid email address.")]
    InvalidEmail,

    #[error("{0} must be a whole number.")]
    InvalidNumber(Field),

    #[error("{0} is out of range.")]
    OutOfRange(Field),
}

/// Doctor-only inputs, kept as typed text until submission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DoctorDetails {
    pub specialization: String,
    pub experience: String,
    pub qualifications: String,
    pub bio: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignupForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
    pub doctor: DoctorDetails,
}

impl SignupForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, field: Field, value: &str) -> Result<(), FormError> {
        let value = value.to_string();
        match field {
            Field::Name => self.name = value,
            Field::Email => self.email = value,
            Field::Password => self.password = value,
            Field::Role => {
                self.role = value
                    .trim()
                    .parse()
                    .map_err(|_| FormError::UnknownRole(value.clone()))?
            }
            Field::Specialization => self.doctor.specialization = value,
            Field::Experience => self.doctor.experience = value,
            Field::Qualifications => self.doctor.qualifications = value,
            Field::Bio => self.doctor.bio = value,
        }
        Ok(())
    }

    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Name => &self.name,
            Field::Email => &self.email,
            Field::Password => &self.password,
            Field::Role => self.role.as_str(),
            Field::Specialization => &self.doctor.specialization,
            Field::Experience => &self.doctor.experience,
            Field::Qualifications => &self.doctor.qualifications,
            Field::Bio => &self.doctor.bio,
        }
    }

    /// Inputs currently on screen: the doctor block only for doctors.
    pub fn visible_fields(&self) -> Vec<Field> {
        let mut fields = Field::BASE.to_vec();
        if self.role == Role::Doctor {
            fields.extend(Field::DOCTOR);
        }
        fields
    }

    fn experience(&self) -> Result<u32, FormError> {
        let years: u32 = self
            .doctor
            .experience
            .trim()
            .parse()
            .map_err(|_| FormError::InvalidNumber(Field::Experience))?;
        if years > MAX_EXPERIENCE_YEARS {
            return Err(FormError::OutOfRange(Field::Experience));
        }
        Ok(years)
    }

    /// Checks every visible input and builds the body to post.
    pub fn to_payload(&self) -> Result<SignupPayload, FormError> {
        if let Some(field) = self
            .visible_fields()
            .into_iter()
            .find(|field| self.get(*field).trim().is_empty())
        {
            return Err(FormError::Required(field));
        }
        if !looks_like_email(&self.email) {
            return Err(FormError::InvalidEmail);
        }

        let name = self.name.trim().to_string();
        let email = self.email.trim().to_string();
        let password = self.password.clone();

        Ok(match self.role {
            Role::Patient => SignupPayload::Patient(AccountSignup { name, email, password }),
            Role::Pharmacy => SignupPayload::Pharmacy(AccountSignup { name, email, password }),
            Role::Doctor => SignupPayload::Doctor(DoctorSignup {
                name,
                email,
                password,
                specialization: self.doctor.specialization.trim().to_string(),
                experience: self.experience()?,
                qualifications: self.doctor.qualifications.trim().to_string(),
                bio: self.doctor.bio.trim().to_string(),
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled(role: &str) -> SignupForm {
        let mut form = SignupForm::new();
        for (field, value) in [
            (Field::Name, "Ada"),
            (Field::Email, "ada@example.com"),
            (Field::Password, "engine"),
            (Field::Role, role),
            (Field::Specialization, "Cardiologist"),
            (Field::Experience, "9"),
            (Field::Qualifications, "MBBS, MD"),
            (Field::Bio, "Heart doctor"),
        ] {
            form.set(field, value).unwrap();
        }
        form
    }

    #[test]
    fn starts_empty_as_patient() {
        let form = SignupForm::new();
        assert_eq!(form.role, Role::Patient);
        assert_eq!(form.visible_fields(), Field::BASE.to_vec());
    }

    #[test]
    fn doctor_fields_render_only_for_doctors() {
        let mut form = SignupForm::new();
        form.set(Field::Role, "Doctor").unwrap();
        assert_eq!(form.visible_fields().len(), 8);
        form.set(Field::Role, "Pharmacy").unwrap();
        assert_eq!(form.visible_fields().len(), 4);
    }

    #[test]
    fn non_doctor_payload_omits_doctor_fields() {
        for role in ["Patient", "Pharmacy"] {
            let json = serde_json::to_value(filled(role).to_payload().unwrap()).unwrap();
            let keys: Vec<&str> = json.as_object().unwrap().keys().map(String::as_str).collect();
            for field in Field::DOCTOR {
                assert!(!keys.contains(&field.as_str()), "{role} leaked {field}");
            }
            assert_eq!(json["role"], role);
        }
    }

    #[test]
    fn doctor_payload_carries_all_doctor_fields() {
        let json = serde_json::to_value(filled("Doctor").to_payload().unwrap()).unwrap();
        assert_eq!(json["role"], "Doctor");
        assert_eq!(json["specialization"], "Cardiologist");
        assert_eq!(json["experience"], 9);
        assert_eq!(json["qualifications"], "MBBS, MD");
        assert_eq!(json["bio"], "Heart doctor");
    }

    #[test]
    fn doctor_fields_are_required_only_for_doctors() {
        let mut form = filled("Patient");
        form.set(Field::Bio, "").unwrap();
        assert!(form.to_payload().is_ok());

        form.set(Field::Role, "Doctor").unwrap();
        assert_eq!(form.to_payload(), Err(FormError::Required(Field::Bio)));
    }

    #[test]
    fn experience_must_be_a_number() {
        let mut form = filled("Doctor");
        form.set(Field::Experience, "ten").unwrap();
        assert_eq!(
            form.to_payload(),
            Err(FormError::InvalidNumber(Field::Experience))
        );
    }

    #[test]
    fn experience_is_bounded() {
        let mut form = filled("Doctor");
        form.set(Field::Experience, "3000000000").unwrap();
        assert_eq!(
            form.to_payload().unwrap_err().to_string(),
            "experience is out of range."
        );
        form.set(Field::Experience, "100").unwrap();
        assert!(form.to_payload().is_ok());
    }

    #[test]
    fn base_fields_and_email_are_checked() {
        let mut form = filled("Patient");
        form.set(Field::Name, "  ").unwrap();
        assert_eq!(
            form.to_payload().unwrap_err().to_string(),
            "Please fill out the name field."
        );

        let mut form = filled("Patient");
        form.set(Field::Email, "ada.example.com").unwrap();
        assert_eq!(form.to_payload(), Err(FormError::InvalidEmail));
    }

    #[test]
    fn unknown_names_are_errors() {
        assert_eq!(
            "nickname".parse::<Field>(),
            Err(FormError::UnknownField("nickname".into()))
        );
        let mut form = SignupForm::new();
        assert_eq!(
            form.set(Field::Role, "Admin"),
            Err(FormError::UnknownRole("Admin".into()))
        );
        assert_eq!(form.role, Role::Patient);
    }
}
