//! Shared state for the API layer: database handle, session store and
//! credential helpers.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use axum::async_trait;
use axum::extract::{FromRequest, Request};
use axum::Json;
use rusqlite::Connection;
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::models::enums::Role;

const PBKDF2_ITERATIONS: u32 = 100_000;
const SALT_LENGTH: usize = 16;
const HASH_LENGTH: usize = 32;

/// Shared context for all routes and middleware. Cloning is cheap; the
/// connection and session store sit behind `Arc<Mutex<_>>`.
#[derive(Clone)]
pub struct ApiContext {
    pub db: Arc<Mutex<Connection>>,
    pub sessions: Arc<Mutex<SessionStore>>,
}

impl ApiContext {
    pub fn new(conn: Connection) -> Self {
        Self {
            db: Arc::new(Mutex::new(conn)),
            sessions: Arc::new(Mutex::new(SessionStore::new())),
        }
    }

    pub fn lock_db(&self) -> Result<MutexGuard<'_, Connection>, ApiError> {
        self.db
            .lock()
            .map_err(|_| ApiError::Internal("database lock poisoned".into()))
    }

    pub fn lock_sessions(&self) -> Result<MutexGuard<'_, SessionStore>, ApiError> {
        self.sessions
            .lock()
            .map_err(|_| ApiError::Internal("session lock poisoned".into()))
    }
}

/// Request body extractor. Same as `Json` except that a malformed or
/// out-of-range body becomes a 400 in the standard error envelope
/// instead of axum's plain-text rejection.
pub struct ApiJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(ApiJson(value)),
            Err(rejection) => Err(ApiError::BadRequest(rejection.body_text())),
        }
    }
}

/// Authenticated caller, injected into request extensions by the auth
/// middleware after token validation.
#[derive(Debug, Clone, Copy)]
pub struct AuthContext {
    pub user_id: Uuid,
    pub role: Role,
}

/// In-memory bearer session store keyed by token hash. Sessions live
/// until logout or process exit.
pub struct SessionStore {
    sessions: HashMap<[u8; 32], AuthContext>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self {
            sessions: HashMap::new(),
        }
    }

    /// Issue a fresh token for the user and return it in plaintext.
    /// Only the hash is retained.
    pub fn issue(&mut self, user_id: Uuid, role: Role) -> String {
        let token = generate_token();
        self.sessions
            .insert(hash_token(&token), AuthContext { user_id, role });
        token
    }

    pub fn resolve(&self, token: &str) -> Option<AuthContext> {
        self.sessions.get(&hash_token(token)).copied()
    }

    /// Returns the session owner if the token was live.
    pub fn revoke(&mut self, token: &str) -> Option<AuthContext> {
        self.sessions.remove(&hash_token(token))
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Hash a bearer token string using SHA-256.
pub fn hash_token(token: &str) -> [u8; 32] {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hasher.finalize().into()
}

/// Generate a random bearer token (URL-safe base64, 32 bytes of entropy).
pub fn generate_token() -> String {
    use base64::Engine;
    let bytes: [u8; 32] = rand::random();
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

/// PBKDF2-SHA256 password hash, stored as `base64(salt)$base64(hash)`.
pub fn hash_password(password: &str) -> String {
    use base64::Engine;
    let salt: [u8; SALT_LENGTH] = rand::random();
    let mut derived = [0u8; HASH_LENGTH];
    pbkdf2::pbkdf2_hmac::<sha2::Sha256>(
        password.as_bytes(),
        &salt,
        PBKDF2_ITERATIONS,
        &mut derived,
    );
    let engine = base64::engine::general_purpose::STANDARD;
    format!("{}${}", engine.encode(salt), engine.encode(derived))
}

pub fn verify_password(password: &str, stored: &str) -> bool {
    use base64::Engine;
    let engine = base64::engine::general_purpose::STANDARD;
    let Some((salt_b64, hash_b64)) = stored.split_once('$') else {
        return false;
    };
    let (Ok(salt), Ok(expected)) = (engine.decode(salt_b64), engine.decode(hash_b64)) else {
        return false;
    };
    let mut derived = [0u8; HASH_LENGTH];
    pbkdf2::pbkdf2_hmac::<sha2::Sha256>(
        password.as_bytes(),
        &salt,
        PBKDF2_ITERATIONS,
        &mut derived,
    );
    derived.as_slice() == expected.as_slice()
}
