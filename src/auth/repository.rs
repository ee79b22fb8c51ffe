use rusqlite::OptionalExtension;
use std::sync::Arc;

use crate::auth::principal::Principal;
use crate::database::{Database, DbResult};
use crate::models::UserStatus;

/// Stored login data for one account.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub user_id: i64,
    pub email: String,
    pub password_hash: String,
    pub status: UserStatus,
    pub privileges: Vec<String>,
}

impl Credentials {
    pub fn to_principal(&self) -> Principal {
        Principal::new(self.user_id, self.email.clone(), self.privileges.iter().cloned())
    }
}

pub struct CredentialRepository {
    db: Arc<Database>,
}

impl CredentialRepository {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    pub async fn find_by_email(&self, email: &str) -> DbResult<Option<Credentials>> {
        let db = self.db.clone();
        let email = email.to_string();

        tokio::task::spawn_blocking(move || -> DbResult<Option<Credentials>> {
            let conn = db.lock()?;

            let credentials = conn
                .query_row(
                    "SELECT id, email, password_hash, status FROM users WHERE email = ?1 COLLATE NOCASE",
                    [&email],
                    |row| {
                        Ok(Credentials {
                            user_id: row.get(0)?,
                            email: row.get(1)?,
                            password_hash: row.get(2)?,
                            status: UserStatus::from(row.get::<_, String>(3)?),
                            privileges: Vec::new(),
                        })
                    },
                )
                .optional()?;

            let Some(mut credentials) = credentials else {
                return Ok(None);
            };

            let mut stmt = conn.prepare(
                "SELECT privilege FROM user_privileges WHERE user_id = ?1 ORDER BY privilege",
            )?;
            credentials.privileges = stmt
                .query_map([credentials.user_id], |row| row.get::<_, String>(0))?
                .collect::<Result<Vec<_>, _>>()?;

            Ok(Some(credentials))
        })
        .await?
    }
}
