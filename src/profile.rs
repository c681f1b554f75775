//! # Profile Documents
//!
//! One document per auth-provider user id.
//!
//! The PUT body is a partial document: on first write it becomes a new
//! record with defaults filled in, afterwards it is merged over the stored
//! record field by field. Either way the merged result is validated as a
//! whole before anything is written, so a rejected payload never leaves a
//! half-updated document behind.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

pub const BLOOD_GROUPS: [&str; 9] = ["A+", "A-", "B+", "B-", "AB+", "AB-", "O+", "O-", ""];

pub const RELATIONSHIPS: [&str; 8] = [
    "Parent",
    "Sibling",
    "Spouse",
    "Child",
    "Friend",
    "Relative",
    "Colleague",
    "Other",
];

pub const DEFAULT_TRUST_SCORE: u8 = 80;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EmergencyContact {
    pub name: String,
    pub relationship: String,
    pub phone: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileRecord {
    pub user_id: String,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blood_group: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub medical_conditions: Option<String>,
    #[serde(default)]
    pub emergency_contacts: Vec<EmergencyContact>,
    pub trust_score: u8,
    pub join_date: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
}

/// Partial document accepted by the PUT endpoint. Absent fields leave the
/// stored value untouched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProfilePatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub blood_group: Option<String>,
    pub medical_conditions: Option<String>,
    pub emergency_contacts: Option<Vec<EmergencyContact>>,
    pub trust_score: Option<i64>,
}

impl ProfileRecord {
    /// Builds a new record from a patch, filling in creation defaults.
    pub fn create(user_id: &str, patch: ProfilePatch, now: DateTime<Utc>) -> Result<Self, AppError> {
        let mut record = Self {
            user_id: user_id.to_string(),
            name: String::new(),
            email: String::new(),
            phone: None,
            address: None,
            blood_group: None,
            medical_conditions: None,
            emergency_contacts: Vec::new(),
            trust_score: DEFAULT_TRUST_SCORE,
            join_date: now,
            last_updated: now,
        };
        record.merge(patch);
        record.validated()
    }

    /// Merges a patch over an existing record and refreshes `lastUpdated`.
    pub fn update(mut self, patch: ProfilePatch, now: DateTime<Utc>) -> Result<Self, AppError> {
        self.merge(patch);
        // lastUpdated never precedes joinDate, even under clock skew
        self.last_updated = now.max(self.join_date);
        self.validated()
    }

    fn merge(&mut self, patch: ProfilePatch) {
        if let Some(name) = patch.name {
            self.name = name.trim().to_string();
        }
        if let Some(email) = patch.email {
            self.email = email.trim().to_lowercase();
        }
        if let Some(phone) = patch.phone {
            self.phone = Some(phone.trim().to_string());
        }
        if let Some(address) = patch.address {
            self.address = Some(address.trim().to_string());
        }
        if let Some(blood_group) = patch.blood_group {
            self.blood_group = Some(blood_group.trim().to_string());
        }
        if let Some(conditions) = patch.medical_conditions {
            self.medical_conditions = Some(conditions.trim().to_string());
        }
        if let Some(contacts) = patch.emergency_contacts {
            self.emergency_contacts = contacts
                .into_iter()
                .map(|c| EmergencyContact {
                    name: c.name.trim().to_string(),
                    relationship: c.relationship.trim().to_string(),
                    phone: c.phone.trim().to_string(),
                })
                .collect();
        }
        if let Some(score) = patch.trust_score {
            self.trust_score = score.clamp(0, 100) as u8;
        }
    }

    fn validated(self) -> Result<Self, AppError> {
        let violations = self.violations();
        if violations.is_empty() {
            Ok(self)
        } else {
            Err(AppError::Validation(violations))
        }
    }

    fn violations(&self) -> Vec<String> {
        let mut violations = Vec::new();

        if self.name.is_empty() {
            violations.push("Name is required".to_string());
        }
        if self.email.is_empty() {
            violations.push("Email is required".to_string());
        }

        if let Some(blood_group) = &self.blood_group {
            if !BLOOD_GROUPS.contains(&blood_group.as_str()) {
                violations.push(format!("`{blood_group}` is not a valid blood group"));
            }
        }

        for contact in &self.emergency_contacts {
            if contact.name.is_empty() {
                violations.push("Emergency contact name is required".to_string());
            }
            if contact.phone.is_empty() {
                violations.push("Emergency contact phone is required".to_string());
            }
            if !RELATIONSHIPS.contains(&contact.relationship.as_str()) {
                violations.push(format!(
                    "`{}` is not a valid relationship",
                    contact.relationship
                ));
            }
        }

        violations
    }
}
