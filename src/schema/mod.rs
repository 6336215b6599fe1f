use serde::{Deserialize, Serialize};

use crate::models::user::Role;

pub mod admin;
pub mod public;
pub mod student;

#[derive(Deserialize, Serialize, Debug)]
pub struct JWTClaims{
    pub sub: String,
    pub role: Role,
    pub exp: usize,
}

/// Session of an authenticated request, inserted into the request extensions by the
/// role guards.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct SessionUser{
    pub email: String,
    pub role: Role,
}

#[derive(Deserialize, Serialize)]
pub struct EmailAndPassword{
    pub email: String,
    pub password: String,
}

#[derive(Serialize, Deserialize)]
pub struct SigninResponse{
    pub success: bool,
    pub token: String,
    pub user: SessionUser,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct MessageResponse{
    pub success: bool,
    pub message: String,
}

impl MessageResponse{
    pub fn ok(message: impl Into<String>) -> Self{
        MessageResponse{ success: true, message: message.into() }
    }
}

#[derive(Deserialize, Default, Debug)]
pub struct ListQuery{
    pub status: Option<String>,
    pub search: Option<String>,
    pub category: Option<String>,
    pub active: Option<bool>,
}

impl ListQuery{
    pub fn search(&self) -> Option<String>{
        self.search.as_deref().map(str::trim).filter(|s| !s.is_empty()).map(str::to_string)
    }
}

#[derive(Deserialize, Default, Debug)]
pub struct PageQuery{
    pub page: Option<i64>,
    pub limit: Option<i64>,
}
