use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::validation::FieldErrors;

const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct User {
    pub id: Uuid,
    pub user_name: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub id: Uuid,
    pub user_name: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl NewUser {
    pub fn new(user_name: String, email: String, password_hash: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_name,
            email,
            password_hash,
            created_at: Utc::now(),
        }
    }
}

/// User names and emails are unique regardless of case.
pub fn normalize(value: &str) -> String {
    value.trim().to_uppercase()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Admin,
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "Admin",
            Role::User => "User",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Admin" => Ok(Role::Admin),
            "User" => Ok(Role::User),
            other => Err(format!("Unknown role: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub user_name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub user_name: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUserDto {
    pub user_name: String,
    pub email: String,
    pub token: String,
}

fn email_pattern() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| {
        Regex::new(r"^[^@\s]+@[^@\s]+$").expect("email pattern is a valid regex")
    })
}

impl RegisterRequest {
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::default();

        if self.user_name.trim().is_empty() {
            errors.push("userName", "User name is required");
        }

        if self.email.trim().is_empty() {
            errors.push("email", "Email is required");
        } else if !email_pattern().is_match(self.email.trim()) {
            errors.push("email", "Email is not a valid e-mail address");
        }

        let password = &self.password;
        if password.is_empty() {
            errors.push("password", "Password is required");
        } else {
            if password.chars().count() < MIN_PASSWORD_LEN {
                errors.push(
                    "password",
                    format!("Password must be at least {} characters long", MIN_PASSWORD_LEN),
                );
            }
            if !password.chars().any(|c| c.is_ascii_digit()) {
                errors.push("password", "Password must contain a digit");
            }
            if !password.chars().any(|c| c.is_lowercase()) {
                errors.push("password", "Password must contain a lowercase letter");
            }
            if !password.chars().any(|c| c.is_uppercase()) {
                errors.push("password", "Password must contain an uppercase letter");
            }
            if password.chars().all(|c| c.is_alphanumeric()) {
                errors.push("password", "Password must contain a non-alphanumeric character");
            }
        }

        errors.into_result()
    }
}

impl LoginRequest {
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::default();
        if self.user_name.trim().is_empty() {
            errors.push("userName", "User name is required");
        }
        if self.password.is_empty() {
            errors.push("password", "Password is required");
        }
        errors.into_result()
    }
}
