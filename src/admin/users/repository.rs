use rusqlite::{types::Value, OptionalExtension, TransactionBehavior};
use std::sync::Arc;
use tracing::info;

use crate::admin::users::models::{NewUser, UserRecord};
use crate::auth::password::hash_password;
use crate::auth::principal::SUPER_PRIVILEGE;
use crate::database::{parse_datetime, Database, DbError, DbResult, UNICODE_LOWER};
use crate::listing::{Filter, MatchMode, PageRequest, RecordStore, StorePage};
use crate::models::UserStatus;

const USER_COLUMNS: &str = "id, email, first_name, last_name, status, created_at";

pub struct AdminUserRepository {
    db: Arc<Database>,
}

impl AdminUserRepository {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Create a user with its privileges in one transaction
    pub async fn create_user(&self, user: NewUser) -> DbResult<UserRecord> {
        let password_hash = hash_password(&user.password)?;
        let db = self.db.clone();

        let user_id = tokio::task::spawn_blocking(move || -> DbResult<i64> {
            let mut conn = db.lock()?;
            let tx = conn.transaction()?;

            tx.execute(
                "INSERT INTO users (email, password_hash, first_name, last_name, status)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                rusqlite::params![
                    &user.email,
                    &password_hash,
                    &user.first_name,
                    &user.last_name,
                    user.status.as_str()
                ],
            )?;
            let user_id = tx.last_insert_rowid();

            {
                let mut stmt = tx.prepare(
                    "INSERT INTO user_privileges (user_id, privilege) VALUES (?1, ?2)",
                )?;
                for privilege in &user.privileges {
                    stmt.execute(rusqlite::params![user_id, privilege])?;
                }
            }

            tx.commit()?;
            Ok(user_id)
        })
        .await??;

        self.find_by_id(user_id).await
    }

    /// Check if email already exists (case-insensitive)
    pub async fn email_exists(&self, email: &str) -> DbResult<bool> {
        let db = self.db.clone();
        let email = email.to_string();

        tokio::task::spawn_blocking(move || -> DbResult<bool> {
            let conn = db.lock()?;

            let mut stmt = conn.prepare("SELECT id FROM users WHERE email = ?1 COLLATE NOCASE")?;
            let result = stmt.query_row([&email], |_row| Ok(())).optional()?;

            Ok(result.is_some())
        })
        .await?
    }

    /// Find user by ID
    pub async fn find_by_id(&self, id: i64) -> DbResult<UserRecord> {
        let db = self.db.clone();

        tokio::task::spawn_blocking(move || -> DbResult<UserRecord> {
            let conn = db.lock()?;

            let user = conn.query_row(
                &format!("SELECT {} FROM users WHERE id = ?1", USER_COLUMNS),
                [id],
                map_user,
            )?;

            Ok(user)
        })
        .await?
    }

    /// Creates a super-privileged account unless `email` is taken.
    /// Returns whether an account was created.
    pub async fn ensure_bootstrap_admin(&self, email: &str, password: &str) -> DbResult<bool> {
        if self.email_exists(email).await? {
            return Ok(false);
        }

        let admin = self
            .create_user(NewUser {
                email: email.to_string(),
                password: password.to_string(),
                first_name: None,
                last_name: None,
                status: UserStatus::Active,
                privileges: [SUPER_PRIVILEGE.to_string()].into_iter().collect(),
            })
            .await?;

        info!(user_id = admin.id, "Bootstrap admin account created");
        Ok(true)
    }
}

impl RecordStore for AdminUserRepository {
    type Record = UserRecord;

    /// Counts and slices inside one read transaction under a single lock, so
    /// the total always describes the same rows the page was cut from.
    async fn fetch_page(&self, request: &PageRequest) -> DbResult<StorePage<UserRecord>> {
        let db = self.db.clone();
        let request = request.clone();

        tokio::task::spawn_blocking(move || -> DbResult<StorePage<UserRecord>> {
            let mut conn = db.lock()?;
            let tx = conn.transaction_with_behavior(TransactionBehavior::Deferred)?;

            let (where_clause, mut params) = match &request.filter {
                Some(filter) => filter_clause(filter),
                None => (String::new(), Vec::new()),
            };

            let total_count: i64 = tx.query_row(
                &format!("SELECT COUNT(*) FROM users {}", where_clause),
                rusqlite::params_from_iter(params.iter()),
                |row| row.get(0),
            )?;

            let limit_index = params.len() + 1;
            params.push(Value::Integer(
                i64::try_from(request.limit()).unwrap_or(i64::MAX),
            ));
            params.push(Value::Integer(
                i64::try_from(request.offset()).unwrap_or(i64::MAX),
            ));

            let sql = format!(
                "SELECT {} FROM users {} ORDER BY {} {}, id ASC LIMIT ?{} OFFSET ?{}",
                USER_COLUMNS,
                where_clause,
                request.sort.column,
                request.sort.direction.as_sql(),
                limit_index,
                limit_index + 1,
            );

            let records = {
                let mut stmt = tx.prepare(&sql)?;
                let rows = stmt
                    .query_map(rusqlite::params_from_iter(params.iter()), map_user)?
                    .collect::<Result<Vec<_>, _>>()?;
                rows
            };

            tx.commit()?;

            Ok(StorePage {
                records,
                total_count: total_count.max(0) as u64,
            })
        })
        .await?
    }
}

/// SQL `WHERE` clause and its bound parameter for `filter`. The column name
/// comes from the listing allow-list.
fn filter_clause(filter: &Filter) -> (String, Vec<Value>) {
    match filter.mode {
        MatchMode::Substring => (
            format!(
                "WHERE {lower}({}) LIKE {lower}(?1) ESCAPE '\\'",
                filter.column,
                lower = UNICODE_LOWER
            ),
            vec![Value::Text(format!("%{}%", escape_like(&filter.text)))],
        ),
        MatchMode::Exact => (
            format!("WHERE {} = ?1 COLLATE NOCASE", filter.column),
            vec![Value::Text(filter.text.clone())],
        ),
    }
}

/// Whether `error` is a `UNIQUE` constraint failure, e.g. an email taken by
/// a concurrent insert.
pub fn is_unique_violation(error: &DbError) -> bool {
    matches!(
        error.downcast_ref::<rusqlite::Error>(),
        Some(rusqlite::Error::SqliteFailure(e, _))
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn map_user(row: &rusqlite::Row<'_>) -> rusqlite::Result<UserRecord> {
    Ok(UserRecord {
        id: row.get(0)?,
        email: row.get(1)?,
        first_name: row.get(2)?,
        last_name: row.get(3)?,
        status: UserStatus::from(row.get::<_, String>(4)?),
        created_at: parse_datetime(&row.get::<_, String>(5)?),
    })
}
