use argon2::{
    password_hash::{
        rand_core::OsRng, Error, PasswordHasher, SaltString
    }, Argon2, PasswordHash, PasswordVerifier
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use rand::distr::{Alphanumeric, SampleString};

use crate::{models::user::Role, schema::JWTClaims};

pub fn hash_password(password:&str)->Result<String, Error>{

    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    let password_hash = argon2.hash_password(password.as_bytes(), salt.as_salt())?.to_string();
    Ok(password_hash)
}

pub fn verify_password(password:&str, hash:&str)->Result<(), Error>{

    let argon2 = Argon2::default();
    let parsed_hash = PasswordHash::new(hash)?;
    argon2.verify_password(password.as_bytes(), &parsed_hash)?;

    Ok(())
}

pub fn issue_token(email:&str, role:Role, secret:&str, ttl_hours:i64) -> Result<String, jsonwebtoken::errors::Error>{

    let expires = Utc::now() + Duration::hours(ttl_hours);

    let claims = JWTClaims{
        sub: email.to_string(),
        role,
        exp: expires.timestamp() as usize
    };

    encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_bytes()))
}

pub fn decode_token(token:&str, secret:&str) -> Result<JWTClaims, jsonwebtoken::errors::Error>{

    let decoded = decode::<JWTClaims>(token, &DecodingKey::from_secret(secret.as_bytes()), &Validation::default())?;

    Ok(decoded.claims)
}

pub const TEMPORARY_PASSWORD_LEN: usize = 12;

/// Initial password for a student enrolled without one; it is mailed to them.
pub fn generate_temporary_password() -> String{
    Alphanumeric.sample_string(&mut rand::rng(), TEMPORARY_PASSWORD_LEN)
}

/// Accepts both a raw token and the `Bearer <token>` form.
pub fn strip_bearer(header:&str) -> &str{
    header.strip_prefix("Bearer ").unwrap_or(header).trim()
}

#[cfg(test)]
mod tests{
    use super::*;

    #[test]
    fn password_round_trip(){
        let hash = hash_password("admin123").unwrap();

        assert!(verify_password("admin123", &hash).is_ok());
        assert!(verify_password("admin124", &hash).is_err());
    }

    #[test]
    fn temporary_passwords_are_alphanumeric(){
        let first = generate_temporary_password();

        assert_eq!(first.len(), TEMPORARY_PASSWORD_LEN);
        assert!(first.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(first, generate_temporary_password());
    }

    #[test]
    fn token_carries_role(){
        let token = issue_token("admin@thefringe.com", Role::Admin, "secret", 1).unwrap();
        let claims = decode_token(strip_bearer(&format!("Bearer {}", token)), "secret").unwrap();

        assert_eq!(claims.sub, "admin@thefringe.com");
        assert_eq!(claims.role, Role::Admin);
        assert!(decode_token(&token, "other-secret").is_err());
    }
}
