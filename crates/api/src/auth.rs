use argon2::password_hash::{
    rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
};
use argon2::Argon2;
use chrono::{Duration, Utc};
use entity::admin_user;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, DbErr, EntityTrait,
    QueryFilter,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::error::{FleetError, FleetResult};
use crate::fleet::required_text;

pub const SESSION_COOKIE: &str = "fleet_session";

const USERNAME_MAX: usize = 150;
const PASSWORD_MIN: usize = 8;

#[derive(Clone, Debug)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub session_ttl_minutes: i64,
}

impl AuthConfig {
    pub fn encoding_key(&self) -> EncodingKey {
        EncodingKey::from_secret(self.jwt_secret.as_bytes())
    }

    pub fn decoding_key(&self) -> DecodingKey {
        DecodingKey::from_secret(self.jwt_secret.as_bytes())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: Uuid,
    pub username: String,
    pub exp: usize,
    pub iat: usize,
}

/// An authenticated, active administrator attached to the GraphQL request.
#[derive(Debug, Clone)]
pub struct CurrentAdmin {
    pub user_id: Uuid,
    pub username: String,
}

pub fn issue_token(
    admin: &admin_user::Model,
    config: &AuthConfig,
) -> jsonwebtoken::errors::Result<String> {
    let now = Utc::now();
    let exp = now
        .checked_add_signed(Duration::minutes(config.session_ttl_minutes))
        .unwrap_or(now)
        .timestamp() as usize;
    let claims = SessionClaims {
        sub: admin.id,
        username: admin.username.clone(),
        exp,
        iat: now.timestamp() as usize,
    };
    jsonwebtoken::encode(&Header::default(), &claims, &config.encoding_key())
}

pub fn decode_token(
    token: &str,
    config: &AuthConfig,
) -> jsonwebtoken::errors::Result<SessionClaims> {
    jsonwebtoken::decode::<SessionClaims>(token, &config.decoding_key(), &Validation::default())
        .map(|data| data.claims)
}

pub fn hash_password(password: &str) -> Result<String, DbErr> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| DbErr::Custom(format!("hash error: {}", err)))
}

pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    match PasswordHash::new(stored_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

/// Outcome of a credential check. Disabled accounts are reported apart from bad
/// credentials so the caller can answer `FORBIDDEN`.
#[derive(Debug)]
pub enum LoginOutcome {
    Granted(admin_user::Model),
    InvalidCredentials,
    Disabled,
}

#[instrument(name = "fleet.auth.login", skip(conn, password))]
pub async fn check_credentials<C>(
    conn: &C,
    username: &str,
    password: &str,
) -> FleetResult<LoginOutcome>
where
    C: ConnectionTrait,
{
    let Some(admin) = admin_user::Entity::find()
        .filter(admin_user::Column::Username.eq(username.trim()))
        .one(conn)
        .await?
    else {
        return Ok(LoginOutcome::InvalidCredentials);
    };
    if !verify_password(password, &admin.password_hash) {
        return Ok(LoginOutcome::InvalidCredentials);
    }
    if !admin.is_active {
        return Ok(LoginOutcome::Disabled);
    }
    Ok(LoginOutcome::Granted(admin))
}

/// Resolves session claims to an active administrator.
pub async fn load_current_admin<C>(conn: &C, user_id: Uuid) -> FleetResult<Option<CurrentAdmin>>
where
    C: ConnectionTrait,
{
    let admin = admin_user::Entity::find_by_id(user_id).one(conn).await?;
    Ok(admin
        .filter(|admin| admin.is_active)
        .map(|admin| CurrentAdmin {
            user_id: admin.id,
            username: admin.username,
        }))
}

/// Creates an administrator, or resets the password of an existing one.
#[instrument(name = "fleet.auth.create_admin", skip(conn, password))]
pub async fn create_admin<C>(
    conn: &C,
    username: &str,
    password: &str,
) -> FleetResult<admin_user::Model>
where
    C: ConnectionTrait,
{
    let username = required_text("username", username, USERNAME_MAX)?;
    if password.chars().count() < PASSWORD_MIN {
        return Err(FleetError::validation(format!(
            "password must be at least {} characters",
            PASSWORD_MIN
        )));
    }
    let password_hash = hash_password(password)?;
    let now: DateTimeWithTimeZone = Utc::now().into();
    let existing = admin_user::Entity::find()
        .filter(admin_user::Column::Username.eq(username.as_str()))
        .one(conn)
        .await?;
    let model = match existing {
        Some(existing) => {
            let mut active: admin_user::ActiveModel = existing.into();
            active.password_hash = Set(password_hash);
            active.is_active = Set(true);
            active.updated_at = Set(now);
            active.update(conn).await?
        }
        None => {
            admin_user::ActiveModel {
                id: Set(Uuid::new_v4()),
                username: Set(username),
                password_hash: Set(password_hash),
                is_active: Set(true),
                created_at: Set(now),
                updated_at: Set(now),
            }
            .insert(conn)
            .await?
        }
    };
    info!(admin_id = %model.id, username = %model.username, "admin account ready");
    Ok(model)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> AuthConfig {
        AuthConfig {
            jwt_secret: "test-secret".into(),
            session_ttl_minutes: 30,
        }
    }

    fn admin() -> admin_user::Model {
        let now: DateTimeWithTimeZone = Utc::now().into();
        admin_user::Model {
            id: Uuid::new_v4(),
            username: "frota".into(),
            password_hash: String::new(),
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn issued_tokens_decode_with_the_same_secret() {
        let admin = admin();
        let token = issue_token(&admin, &config()).unwrap();
        let claims = decode_token(&token, &config()).unwrap();
        assert_eq!(claims.sub, admin.id);
        assert_eq!(claims.username, "frota");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn tokens_signed_with_another_secret_are_rejected() {
        let token = issue_token(&admin(), &config()).unwrap();
        let other = AuthConfig {
            jwt_secret: "other".into(),
            ..config()
        };
        assert!(decode_token(&token, &other).is_err());
    }

    #[test]
    fn password_hashes_verify() {
        let hash = hash_password("correct horse").unwrap();
        assert!(verify_password("correct horse", &hash));
        assert!(!verify_password("wrong", &hash));
        assert!(!verify_password("anything", "not-a-phc-string"));
    }
}
