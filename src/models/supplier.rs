use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, AppResult};

static PHONE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{10}$").expect("phone pattern compiles"));
static EMAIL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\S+@\S+\.\S+$").expect("email pattern compiles"));

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactInfo {
    pub phone: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Supplier {
    pub id: Uuid,
    pub name: String,
    pub contact_info: ContactInfo,
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Supplier {
    /// Case-insensitive substring match over name, phone and email.
    pub fn matches(&self, query: &str) -> bool {
        let needle = query.to_lowercase();
        [&self.name, &self.contact_info.phone, &self.contact_info.email]
            .iter()
            .any(|field| field.to_lowercase().contains(&needle))
    }
}

/// Supplier fields embedded into inventory reads.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SupplierSummary {
    pub id: Uuid,
    pub name: String,
    pub contact_info: ContactInfo,
}

impl From<&Supplier> for SupplierSummary {
    fn from(supplier: &Supplier) -> Self {
        Self {
            id: supplier.id,
            name: supplier.name.clone(),
            contact_info: supplier.contact_info.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SupplierName {
    pub id: Uuid,
    pub name: String,
}

impl From<&Supplier> for SupplierName {
    fn from(supplier: &Supplier) -> Self {
        Self {
            id: supplier.id,
            name: supplier.name.clone(),
        }
    }
}

/// A validated supplier ready to be persisted.
#[derive(Debug, Clone)]
pub struct NewSupplier {
    pub name: String,
    pub contact_info: ContactInfo,
    pub address: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ContactInfoInput {
    pub phone: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSupplier {
    pub name: Option<String>,
    pub contact_info: Option<ContactInfoInput>,
    pub address: Option<String>,
}

impl CreateSupplier {
    pub fn validate(self) -> AppResult<NewSupplier> {
        let name = require_name(self.name)?;
        let contact = self.contact_info.unwrap_or_default();
        let phone = contact
            .phone
            .ok_or_else(|| AppError::Validation("Phone number is required".into()))?;
        let email = contact
            .email
            .ok_or_else(|| AppError::Validation("Email is required".into()))?;

        Ok(NewSupplier {
            name,
            contact_info: ContactInfo {
                phone: validate_phone(&phone)?,
                email: validate_email(&email)?,
            },
            address: clean_optional(self.address),
        })
    }
}

/// Partial update: only the fields present are validated and merged.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupplierPatch {
    pub name: Option<String>,
    pub contact_info: Option<ContactInfoInput>,
    pub address: Option<String>,
}

impl SupplierPatch {
    pub fn apply(self, supplier: &mut Supplier) -> AppResult<()> {
        if let Some(name) = self.name {
            supplier.name = require_name(Some(name))?;
        }
        if let Some(contact) = self.contact_info {
            if let Some(phone) = contact.phone {
                supplier.contact_info.phone = validate_phone(&phone)?;
            }
            if let Some(email) = contact.email {
                supplier.contact_info.email = validate_email(&email)?;
            }
        }
        if let Some(address) = self.address {
            supplier.address = clean_optional(Some(address));
        }
        Ok(())
    }
}

fn require_name(name: Option<String>) -> AppResult<String> {
    name.map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .ok_or_else(|| AppError::Validation("Supplier name is required".into()))
}

/// Exactly ten ASCII digits, surrounding whitespace included in the check.
pub fn validate_phone(phone: &str) -> AppResult<String> {
    if PHONE_PATTERN.is_match(phone) {
        Ok(phone.to_string())
    } else {
        Err(AppError::Validation(
            "Please provide a valid 10-digit phone number".into(),
        ))
    }
}

pub fn validate_email(email: &str) -> AppResult<String> {
    let email = email.trim();
    if EMAIL_PATTERN.is_match(email) {
        Ok(email.to_string())
    } else {
        Err(AppError::Validation("Please provide a valid email".into()))
    }
}

pub(crate) fn clean_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
