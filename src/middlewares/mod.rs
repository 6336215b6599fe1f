use actix_web::{dev::ServiceRequest, http::header, web};

use crate::{errors::AppError, models::user::Role, schema::SessionUser, utils::{decode_token, strip_bearer}, GlobalState};

pub mod admin;
pub mod pages;
pub mod student;

pub const TOKEN_COOKIE: &str = "authToken";
pub const ROLE_COOKIE: &str = "userRole";

/// Resolves the session of an API request: the `Authorization` header first, then the
/// `authToken` cookie. The token must carry `role`.
pub fn authorize(req:&ServiceRequest, role:Role) -> Result<SessionUser, AppError>{

    let state = req.app_data::<web::Data<GlobalState>>().ok_or(AppError::InternalError)?;

    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(|value| strip_bearer(value).to_string())
        .or_else(|| req.cookie(TOKEN_COOKIE).map(|c| c.value().to_string()))
        .filter(|token| !token.is_empty());

    let Some(token) = token else {
        return Err(AppError::Unauthorized("token missing".to_string()));
    };

    let claims = decode_token(&token, &state.config.jwt_secret).map_err(|e|{
        tracing::debug!(error = %e, "rejected session token");
        AppError::Unauthorized("Invalid token".to_string())
    })?;

    if claims.role != role{
        return Err(AppError::Forbidden(format!("{} access required", role.as_str())));
    }

    Ok(SessionUser{ email: claims.sub, role: claims.role })
}
