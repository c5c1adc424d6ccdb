//! Candidate profile schema.
//!
//! Describes what a screening conversation tries to collect. Nothing in the
//! session fills this in automatically; it exists for callers that extract
//! a profile from a transcript and want to check it.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::utilities::errors::ProfileValidationError;

/// Minimum number of digits in an accepted phone number.
const MIN_PHONE_DIGITS: usize = 7;

static EMAIL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9\-]+(\.[A-Za-z0-9\-]+)*\.[A-Za-z]{2,}$")
        .expect("valid email regex")
});

static PHONE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+?[0-9 ().\-]+$").expect("valid phone regex"));

/// The seven profile fields, in the order the interviewer asks for them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileField {
    FullName,
    Email,
    Phone,
    YearsExperience,
    DesiredRoles,
    Location,
    TechStack,
}

impl ProfileField {
    pub const ALL: [ProfileField; 7] = [
        ProfileField::FullName,
        ProfileField::Email,
        ProfileField::Phone,
        ProfileField::YearsExperience,
        ProfileField::DesiredRoles,
        ProfileField::Location,
        ProfileField::TechStack,
    ];

    /// Serialized field name.
    pub fn key(&self) -> &'static str {
        match self {
            ProfileField::FullName => "full_name",
            ProfileField::Email => "email",
            ProfileField::Phone => "phone",
            ProfileField::YearsExperience => "years_experience",
            ProfileField::DesiredRoles => "desired_roles",
            ProfileField::Location => "location",
            ProfileField::TechStack => "tech_stack",
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            ProfileField::FullName => "Full Name",
            ProfileField::Email => "Email Address",
            ProfileField::Phone => "Phone Number",
            ProfileField::YearsExperience => "Years of Experience",
            ProfileField::DesiredRoles => "Desired Position(s)",
            ProfileField::Location => "Current Location",
            ProfileField::TechStack => "Tech Stack",
        }
    }
}

impl fmt::Display for ProfileField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Information gathered about a candidate.
///
/// Every field is optional until filled. Blank strings count as missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateProfile {
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub years_experience: Option<i32>,
    #[serde(default)]
    pub desired_roles: Vec<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub tech_stack: Vec<String>,
}

fn filled(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.trim().is_empty())
}

impl CandidateProfile {
    /// Parse a profile from a JSON object. Unknown keys are ignored.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Whether `field` holds a value.
    pub fn has(&self, field: ProfileField) -> bool {
        match field {
            ProfileField::FullName => filled(&self.full_name),
            ProfileField::Email => filled(&self.email),
            ProfileField::Phone => filled(&self.phone),
            // zero years is a valid answer
            ProfileField::YearsExperience => self.years_experience.is_some(),
            ProfileField::DesiredRoles => !self.desired_roles.is_empty(),
            ProfileField::Location => filled(&self.location),
            ProfileField::TechStack => !self.tech_stack.is_empty(),
        }
    }

    /// Fields still to collect, in question order.
    pub fn missing_fields(&self) -> Vec<ProfileField> {
        ProfileField::ALL
            .into_iter()
            .filter(|field| !self.has(*field))
            .collect()
    }

    /// Whether all seven fields are populated.
    pub fn is_complete(&self) -> bool {
        self.missing_fields().is_empty()
    }

    /// Check the values that are present.
    ///
    /// Missing fields are not violations; use [`is_complete`](Self::is_complete)
    /// for that. All violations are collected rather than stopping at the
    /// first one.
    pub fn validate(&self) -> Result<(), Vec<ProfileValidationError>> {
        let mut errors = Vec::new();

        let text_fields = [
            (ProfileField::FullName, &self.full_name),
            (ProfileField::Location, &self.location),
        ];
        for (field, value) in text_fields {
            if matches!(value.as_deref(), Some(v) if v.trim().is_empty()) {
                errors.push(ProfileValidationError::BlankField(field.key()));
            }
        }

        if let Some(email) = &self.email {
            if !EMAIL.is_match(email.trim()) {
                errors.push(ProfileValidationError::InvalidEmail(email.clone()));
            }
        }

        if let Some(phone) = &self.phone {
            let digits = phone.chars().filter(char::is_ascii_digit).count();
            if !PHONE.is_match(phone.trim()) || digits < MIN_PHONE_DIGITS {
                errors.push(ProfileValidationError::InvalidPhone(phone.clone()));
            }
        }

        if let Some(years) = self.years_experience {
            if years < 0 {
                errors.push(ProfileValidationError::NegativeExperience(years));
            }
        }

        let list_fields = [
            (ProfileField::DesiredRoles, &self.desired_roles),
            (ProfileField::TechStack, &self.tech_stack),
        ];
        for (field, entries) in list_fields {
            if entries.iter().any(|entry| entry.trim().is_empty()) {
                errors.push(ProfileValidationError::EmptyListEntry(field.key()));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_profile() -> CandidateProfile {
        CandidateProfile {
            full_name: Some("Alice Smith".into()),
            email: Some("alice@example.com".into()),
            phone: Some("+1 (555) 010-2030".into()),
            years_experience: Some(0),
            desired_roles: vec!["Backend Engineer".into()],
            location: Some("Lisbon".into()),
            tech_stack: vec!["Rust".into(), "PostgreSQL".into()],
        }
    }

    #[test]
    fn test_complete_profile() {
        let profile = complete_profile();
        assert!(profile.is_complete());
        assert!(profile.missing_fields().is_empty());
        assert_eq!(profile.validate(), Ok(()));
    }

    #[test]
    fn test_empty_profile_misses_everything_in_order() {
        let profile = CandidateProfile::default();
        assert!(!profile.is_complete());
        assert_eq!(profile.missing_fields(), ProfileField::ALL.to_vec());
        // nothing present, nothing to violate
        assert_eq!(profile.validate(), Ok(()));
    }

    #[test]
    fn test_blank_strings_and_empty_lists_are_missing() {
        let mut profile = complete_profile();
        profile.location = Some("   ".into());
        profile.tech_stack.clear();
        assert_eq!(
            profile.missing_fields(),
            vec![ProfileField::Location, ProfileField::TechStack]
        );
        assert_eq!(
            profile.validate(),
            Err(vec![ProfileValidationError::BlankField("location")])
        );
    }

    #[test]
    fn test_validate_collects_all_violations() {
        let profile = CandidateProfile {
            email: Some("alice.example.com".into()),
            phone: Some("12-34".into()),
            years_experience: Some(-2),
            desired_roles: vec!["".into()],
            ..complete_profile()
        };
        let errors = profile.validate().unwrap_err();
        assert_eq!(
            errors,
            vec![
                ProfileValidationError::InvalidEmail("alice.example.com".into()),
                ProfileValidationError::InvalidPhone("12-34".into()),
                ProfileValidationError::NegativeExperience(-2),
                ProfileValidationError::EmptyListEntry("desired_roles"),
            ]
        );
    }

    #[test]
    fn test_phone_rejects_letters() {
        let profile = CandidateProfile {
            phone: Some("call me at 5550102030".into()),
            ..CandidateProfile::default()
        };
        assert!(matches!(
            profile.validate().unwrap_err().as_slice(),
            [ProfileValidationError::InvalidPhone(_)]
        ));
    }

    #[test]
    fn test_from_json_partial() {
        let profile = CandidateProfile::from_json(
            r#"{"full_name": "Bob", "tech_stack": ["Go"], "confidence": 0.4}"#,
        )
        .unwrap();
        assert_eq!(profile.full_name.as_deref(), Some("Bob"));
        assert!(profile.has(ProfileField::TechStack));
        assert_eq!(profile.missing_fields().len(), 5);

        assert!(CandidateProfile::from_json("not json").is_err());
    }

    #[test]
    fn test_field_labels() {
        assert_eq!(ProfileField::YearsExperience.to_string(), "Years of Experience");
        assert_eq!(ProfileField::DesiredRoles.key(), "desired_roles");
    }
}
