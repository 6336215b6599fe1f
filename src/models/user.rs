use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Student,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Student => "student",
        }
    }

    pub fn login_page(&self) -> &'static str {
        match self {
            Role::Admin => "/admin/login",
            Role::Student => "/student/login",
        }
    }
}

impl FromStr for Role {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "student" => Ok(Role::Student),
            other => Err(AppError::bad_request(format!("Unknown role: {}", other))),
        }
    }
}

/// Login credentials; the password is stored as an argon2 PHC string.
#[derive(Debug, Clone)]
pub struct UserAccount {
    pub email: String,
    pub password_hash: String,
    pub role: Role,
}
