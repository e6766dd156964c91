use chrono::{Duration, Utc};
use rand::Rng;
use sha2::{Digest, Sha256};

use crate::{
    cache::Cache,
    error::{Error, Result},
    models::users::{User, UserSession},
    validation::validate_session_token,
};

/// Hash a session token using SHA-256; only the hash is kept server-side.
pub fn hash_session_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

/// 32 random bytes, hex-encoded.
pub fn generate_session_token() -> String {
    let mut bytes = [0u8; 32];
    rand::rng().fill(&mut bytes);
    hex::encode(bytes)
}

fn session_key(token: &str) -> String {
    format!("session:{}", hash_session_token(token.trim()))
}

/// Opens a session for `user` and returns the plaintext token with its record.
pub async fn create_session(
    sessions: &Cache<UserSession>,
    user: &User,
    ttl_seconds: u64,
) -> Result<(String, UserSession)> {
    let token = generate_session_token();
    let now = Utc::now();
    let session = UserSession {
        user_id: user.id.clone(),
        role: user.role,
        created_at: now,
        expires_at: now + Duration::seconds(ttl_seconds as i64),
    };

    sessions
        .set_ex(&session_key(&token), session.clone(), ttl_seconds)
        .await?;

    tracing::debug!(user_id = %user.id, expires_at = %session.expires_at, "Session established");
    Ok((token, session))
}

/// Looks up the session behind a token.
pub async fn resolve_session(sessions: &Cache<UserSession>, token: &str) -> Result<UserSession> {
    validate_session_token(token)
        .map_err(|_| Error::Authentication("Invalid session token".to_string()))?;

    sessions
        .get(&session_key(token))
        .await?
        .ok_or_else(|| Error::Authentication("Session expired or revoked".to_string()))
}

/// Revokes a specific session by its token.
pub async fn revoke_session(sessions: &Cache<UserSession>, token: &str) -> Result<()> {
    if token.trim().is_empty() {
        return Err(Error::validation("token", "Session token cannot be empty"));
    }

    if !sessions.delete(&session_key(token)).await? {
        return Err(Error::Authentication("Session token not found".to_string()));
    }

    Ok(())
}

/// Revokes every session of a user, e.g. after losing approval.
pub async fn revoke_all_user_sessions(sessions: &Cache<UserSession>, user_id: &str) -> Result<usize> {
    let removed = sessions.remove_where(|s| s.user_id == user_id).await?;
    if removed > 0 {
        tracing::info!(user_id, removed, "Revoked user sessions");
    }
    Ok(removed)
}
