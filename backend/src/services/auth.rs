//! Authentication service for account signup, login and session tokens

use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::models::{Role, User, UserRow};
use shared::validation::{validate_email, validate_name, validate_password};

/// Authentication service
#[derive(Clone)]
pub struct AuthService {
    db: PgPool,
    jwt_secret: String,
    token_expiry: i64,
}

/// Input for creating a new account
#[derive(Debug, Deserialize)]
pub struct SignupInput {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // User ID
    pub role: String,
    pub exp: i64,
    pub iat: i64,
}

/// An authenticated session
#[derive(Debug, Serialize)]
pub struct AuthSession {
    pub user: User,
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

const USER_COLUMNS: &str = "id, first_name, last_name, email, password_hash, role, created_at";

impl AuthService {
    /// Create a new AuthService instance
    pub fn new(db: PgPool, config: &Config) -> Self {
        Self {
            db,
            jwt_secret: config.jwt.secret.clone(),
            token_expiry: config.jwt.access_token_expiry,
        }
    }

    /// Register a new CLIENT account and open a session for it
    pub async fn signup(&self, input: SignupInput) -> AppResult<AuthSession> {
        let email = input.email.trim().to_lowercase();

        validate_name(&input.first_name).map_err(|m| {
            AppError::validation("first_name", m, "Le prénom est requis")
        })?;
        validate_name(&input.last_name)
            .map_err(|m| AppError::validation("last_name", m, "Le nom est requis"))?;
        validate_email(&email)
            .map_err(|m| AppError::validation("email", m, "Adresse email invalide"))?;
        validate_password(&input.password).map_err(|m| {
            AppError::validation(
                "password",
                m,
                "Le mot de passe doit contenir au moins 8 caractères",
            )
        })?;

        let existing = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE email = $1")
            .bind(&email)
            .fetch_one(&self.db)
            .await?;

        if existing > 0 {
            return Err(AppError::Conflict {
                resource: "email".to_string(),
                message: "An account already exists for this email".to_string(),
                message_fr: "Un compte existe déjà pour cet email".to_string(),
            });
        }

        let password_hash = hash(&input.password, DEFAULT_COST)
            .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))?;

        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            INSERT INTO users (first_name, last_name, email, password_hash, role)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(input.first_name.trim())
        .bind(input.last_name.trim())
        .bind(&email)
        .bind(&password_hash)
        .bind(Role::Client.as_str())
        .fetch_one(&self.db)
        .await?;

        let user = row.into_user()?;
        tracing::info!(user_id = %user.id, "New account created");

        self.open_session(user)
    }

    /// Authenticate user with email and password
    pub async fn login(&self, email: &str, password: &str) -> AppResult<AuthSession> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users WHERE email = $1",
            USER_COLUMNS
        ))
        .bind(email.trim().to_lowercase())
        .fetch_optional(&self.db)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

        let valid = verify(password, &row.password_hash)
            .map_err(|e| AppError::Internal(format!("Password verification failed: {}", e)))?;

        if !valid {
            tracing::debug!(user_id = %row.id, "Rejected login attempt");
            return Err(AppError::InvalidCredentials);
        }

        let user = row.into_user()?;
        tracing::info!(user_id = %user.id, role = %user.role, "User logged in");

        self.open_session(user)
    }

    /// Load the account behind a session
    pub async fn current_user(&self, user_id: Uuid) -> AppResult<User> {
        sqlx::query_as::<_, UserRow>(&format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS))
            .bind(user_id)
            .fetch_optional(&self.db)
            .await?
            .ok_or(AppError::InvalidToken)?
            .into_user()
    }

    fn open_session(&self, user: User) -> AppResult<AuthSession> {
        let access_token = encode_token(user.id, user.role, &self.jwt_secret, self.token_expiry)?;

        Ok(AuthSession {
            user,
            access_token,
            token_type: "Bearer".to_string(),
            expires_in: self.token_expiry,
        })
    }
}

/// Sign a session token for a user
pub fn encode_token(user_id: Uuid, role: Role, secret: &str, expiry_secs: i64) -> AppResult<String> {
    let now = Utc::now();
    let claims = Claims {
        sub: user_id.to_string(),
        role: role.as_str().to_string(),
        exp: (now + Duration::seconds(expiry_secs)).timestamp(),
        iat: now.timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("Token generation failed: {}", e)))
}

/// Validate a session token and return its claims
pub fn decode_token(token: &str, secret: &str) -> AppResult<Claims> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| {
        tracing::debug!("Rejected session token: {}", e);
        AppError::InvalidToken
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_round_trip_carries_role() {
        let user_id = Uuid::new_v4();
        let token = encode_token(user_id, Role::Supervisor, "secret", 3600).unwrap();
        let claims = decode_token(&token, "secret").unwrap();

        assert_eq!(claims.sub, user_id.to_string());
        assert_eq!(Role::parse(&claims.role), Some(Role::Supervisor));
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_token_signed_with_other_secret_is_rejected() {
        let token = encode_token(Uuid::new_v4(), Role::Admin, "secret", 3600).unwrap();
        assert!(matches!(
            decode_token(&token, "another-secret"),
            Err(AppError::InvalidToken)
        ));
    }

    #[test]
    fn test_expired_token_is_rejected() {
        // Past the default 60s leeway
        let token = encode_token(Uuid::new_v4(), Role::Client, "secret", -3600).unwrap();
        assert!(matches!(decode_token(&token, "secret"), Err(AppError::InvalidToken)));
    }

    #[test]
    fn test_garbage_token_is_rejected() {
        assert!(decode_token("not-a-token", "secret").is_err());
    }
}
