use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use argon2::password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::server::AppState;
use crate::db::models::User;
use crate::db::repo;

#[derive(Deserialize)]
pub struct AuthPayload {
    pub username: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct AuthResponse {
    pub token: String,
}

#[derive(Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
}

pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<AuthPayload>,
) -> impl IntoResponse {
    if repo::get_user(&state.db, &payload.username).await.is_some() {
        return (
            StatusCode::CONFLICT,
            Json(AuthResponse { token: String::new() }),
        );
    }

    let salt = SaltString::generate(&mut OsRng);
    let password_hash = match Argon2::default().hash_password(payload.password.as_bytes(), &salt) {
        Ok(hash) => hash.to_string(),
        Err(_) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(AuthResponse { token: String::new() }),
            );
        }
    };

    let user = User {
        id: Uuid::new_v4().to_string(),
        username: payload.username,
        password_hash,
        created_at: now_unix(),
    };

    if repo::insert_user(&state.db, &user).await.is_err() {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(AuthResponse { token: String::new() }),
        );
    }

    match issue_token(&state.config.jwt_secret, &user.id) {
        Ok(token) => (StatusCode::OK, Json(AuthResponse { token })),
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(AuthResponse { token: String::new() }),
        ),
    }
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<AuthPayload>,
) -> impl IntoResponse {
    let Some(user) = repo::get_user(&state.db, &payload.username).await else {
        return (
            StatusCode::UNAUTHORIZED,
            Json(AuthResponse { token: String::new() }),
        );
    };

    let Ok(parsed_hash) = PasswordHash::new(&user.password_hash) else {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(AuthResponse { token: String::new() }),
        );
    };

    if Argon2::default()
        .verify_password(payload.password.as_bytes(), &parsed_hash)
        .is_err()
    {
        return (
            StatusCode::UNAUTHORIZED,
            Json(AuthResponse { token: String::new() }),
        );
    }

    match issue_token(&state.config.jwt_secret, &user.id) {
        Ok(token) => (StatusCode::OK, Json(AuthResponse { token })),
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(AuthResponse { token: String::new() }),
        ),
    }
}

fn issue_token(secret: &str, user_id: &str) -> Result<String, jsonwebtoken::errors::Error> {
    let claims = Claims {
        sub: user_id.to_string(),
        exp: (now_unix() + 24 * 3600) as usize,
    };
    encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_bytes()))
}

/// Decodes and validates a bearer token, returning the user id it names.
/// Used by the WebSocket upgrade to gate connections (§6 Identity boundary).
pub fn verify_token(secret: &str, token: &str) -> Option<String> {
    use jsonwebtoken::{decode, DecodingKey, Validation};
    decode::<Claims>(token, &DecodingKey::from_secret(secret.as_bytes()), &Validation::default())
        .ok()
        .map(|data| data.claims.sub)
}

fn now_unix() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}
