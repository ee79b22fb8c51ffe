use argon2::password_hash::rand_core::{OsRng, RngCore};
use subtle::ConstantTimeEq;
use tower_sessions::Session;

use crate::auth::session::SessionResult;

const CSRF_KEY: &str = "csrf_token";
const TOKEN_BYTES: usize = 32;

fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Returns the session's form token, creating one on first use.
pub async fn issue_token(session: &Session) -> SessionResult<String> {
    if let Some(token) = session.get::<String>(CSRF_KEY).await? {
        return Ok(token);
    }
    let token = generate_token();
    session.insert(CSRF_KEY, &token).await?;
    Ok(token)
}

/// Whether `submitted` matches the session's form token.
pub async fn verify_token(session: &Session, submitted: &str) -> SessionResult<bool> {
    let expected: Option<String> = session.get(CSRF_KEY).await?;
    Ok(expected.is_some_and(|expected| {
        bool::from(expected.as_bytes().ct_eq(submitted.as_bytes()))
    }))
}
