use tower_sessions::Session;

use crate::auth::principal::Principal;

const PRINCIPAL_KEY: &str = "principal";

pub type SessionResult<T> = Result<T, tower_sessions::session::Error>;

/// The principal stored by the last successful login, if any.
pub async fn current_principal(session: &Session) -> SessionResult<Option<Principal>> {
    session.get(PRINCIPAL_KEY).await
}

pub async fn establish(session: &Session, principal: &Principal) -> SessionResult<()> {
    session.cycle_id().await?;
    session.insert(PRINCIPAL_KEY, principal).await
}

pub async fn clear(session: &Session) -> SessionResult<()> {
    session.flush().await
}
