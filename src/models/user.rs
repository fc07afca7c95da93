use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::supplier::validate_email,
};

pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Admin,
    Manager,
    Staff,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "Admin",
            Role::Manager => "Manager",
            Role::Staff => "Staff",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Admin" => Ok(Role::Admin),
            "Manager" => Ok(Role::Manager),
            "Staff" => Ok(Role::Staff),
            other => Err(AppError::Validation(format!("Unknown role: {}", other))),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
}

/// Public sign-up payload. There is no role field: self-registered accounts
/// are always `Staff`, and any `role` sent along is ignored.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// An Admin creating an account with an explicit role.
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    #[serde(flatten)]
    pub account: RegisterRequest,
    pub role: Role,
}

/// Account fields after validation; the password is still plain text.
#[derive(Debug)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl RegisterRequest {
    pub fn validate(self) -> AppResult<Registration> {
        let name = self
            .name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .ok_or_else(|| AppError::Validation("Name is required".into()))?;
        let email = self
            .email
            .ok_or_else(|| AppError::Validation("Email is required".into()))?;
        let password = self
            .password
            .ok_or_else(|| AppError::Validation("Password is required".into()))?;
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AppError::Validation(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LEN
            )));
        }

        Ok(Registration {
            name,
            email: validate_email(&email)?.to_lowercase(),
            password,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_parses_its_own_display() {
        for role in [Role::Admin, Role::Manager, Role::Staff] {
            assert_eq!(role.to_string().parse::<Role>().unwrap(), role);
        }
        assert!("root".parse::<Role>().is_err());
    }

    #[test]
    fn registration_normalizes_email() {
        let registration = RegisterRequest {
            name: Some("Dana".into()),
            email: Some("Dana@Example.com".into()),
            password: Some("hunter22".into()),
        }
        .validate()
        .unwrap();
        assert_eq!(registration.email, "dana@example.com");
    }

    #[test]
    fn public_registration_has_no_role_to_claim() {
        let request: RegisterRequest = serde_json::from_value(serde_json::json!({
            "name": "Mallory",
            "email": "mallory@example.com",
            "password": "hunter22",
            "role": "Admin"
        }))
        .unwrap();
        assert!(request.validate().is_ok());
    }

    #[test]
    fn admin_created_account_carries_its_role() {
        let request: CreateUserRequest = serde_json::from_value(serde_json::json!({
            "name": "Morgan",
            "email": "morgan@example.com",
            "password": "hunter22",
            "role": "Manager"
        }))
        .unwrap();
        assert_eq!(request.role, Role::Manager);
        assert_eq!(request.account.validate().unwrap().name, "Morgan");
    }

    #[test]
    fn short_password_is_rejected() {
        let result = RegisterRequest {
            name: Some("Dana".into()),
            email: Some("dana@example.com".into()),
            password: Some("abc".into()),
        }
        .validate();
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn password_hash_never_serializes() {
        let user = User {
            id: Uuid::new_v4(),
            name: "Dana".into(),
            email: "dana@example.com".into(),
            password_hash: "$2b$12$secret".into(),
            role: Role::Manager,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("passwordHash").is_none());
        assert_eq!(json["role"], "Manager");
    }
}
