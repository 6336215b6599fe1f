use actix_web::{cookie::{time::Duration, Cookie, SameSite}, post, web::{self, Json}, HttpResponse};

use crate::{
    errors::AppError,
    middlewares::{ROLE_COOKIE, TOKEN_COOKIE},
    models::user::Role,
    schema::{EmailAndPassword, MessageResponse, SessionUser, SigninResponse},
    utils::{issue_token, verify_password},
    GlobalState,
};

#[post("/admin-login")]
pub async fn admin_login(data:web::Data<GlobalState>, credentials:Json<EmailAndPassword>) -> Result<HttpResponse, AppError>{
    signin(&data, &credentials, Role::Admin).await
}

#[post("/student-login")]
pub async fn student_login(data:web::Data<GlobalState>, credentials:Json<EmailAndPassword>) -> Result<HttpResponse, AppError>{
    signin(&data, &credentials, Role::Student).await
}

#[post("/logout")]
pub async fn logout() -> HttpResponse{
    let mut token = Cookie::build(TOKEN_COOKIE, "").path("/").finish();
    token.make_removal();
    let mut role = Cookie::build(ROLE_COOKIE, "").path("/").finish();
    role.make_removal();

    HttpResponse::Ok()
        .cookie(token)
        .cookie(role)
        .json(MessageResponse::ok("Logged out"))
}

/// Unknown email, wrong password and an account of the other role all answer the same
/// 401 so the response does not reveal which accounts exist.
async fn signin(state:&GlobalState, credentials:&EmailAndPassword, role:Role) -> Result<HttpResponse, AppError>{

    let invalid = || AppError::Unauthorized("Invalid email or password".to_string());

    let email = credentials.email.trim();
    if email.is_empty() || credentials.password.is_empty(){
        return Err(AppError::bad_request("Email and password are required"));
    }

    let account = match state.store.find_account(email).await? {
        Some(account) if account.role == role => account,
        _ => {
            tracing::info!(%email, role = role.as_str(), "login rejected: no matching account");
            return Err(invalid());
        }
    };

    if verify_password(&credentials.password, &account.password_hash).is_err(){
        tracing::info!(%email, role = role.as_str(), "login rejected: wrong password");
        return Err(invalid());
    }

    let ttl = state.config.token_ttl_hours;
    let token = issue_token(&account.email, role, &state.config.jwt_secret, ttl).map_err(|e|{
        tracing::error!(error = %e, "could not sign session token");
        AppError::InternalError
    })?;

    let token_cookie = Cookie::build(TOKEN_COOKIE, token.clone())
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(Duration::hours(ttl))
        .finish();

    let role_cookie = Cookie::build(ROLE_COOKIE, role.as_str())
        .path("/")
        .same_site(SameSite::Lax)
        .max_age(Duration::hours(ttl))
        .finish();

    tracing::info!(email = %account.email, role = role.as_str(), "signed in");

    Ok(HttpResponse::Ok()
        .cookie(token_cookie)
        .cookie(role_cookie)
        .json(SigninResponse{
            success: true,
            token,
            user: SessionUser{ email: account.email, role },
        }))
}
