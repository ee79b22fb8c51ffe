use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::auth::password::MIN_PASSWORD_LENGTH;
use crate::auth::principal::parse_privileges;
use crate::listing::{CellValue, Searchable};
use crate::models::UserStatus;

/// A user row as shown in the admin listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: i64,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub status: UserStatus,
    pub created_at: DateTime<Utc>,
}

impl Searchable for UserRecord {
    fn id(&self) -> i64 {
        self.id
    }

    fn column_value(&self, column: &str) -> Option<CellValue> {
        match column {
            "id" => Some(CellValue::Int(self.id)),
            "email" => Some(CellValue::Text(self.email.clone())),
            "first_name" => self.first_name.clone().map(CellValue::Text),
            "last_name" => self.last_name.clone().map(CellValue::Text),
            "status" => Some(CellValue::Text(self.status.as_str().to_string())),
            "created_at" => Some(CellValue::Text(
                self.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            )),
            _ => None,
        }
    }
}

/// The new-user form as submitted.
#[derive(Debug, Deserialize)]
pub struct NewUserForm {
    #[serde(default)]
    pub csrf_token: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub privileges: String,
}

/// A validated account ready to persist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub email: String,
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub status: UserStatus,
    pub privileges: BTreeSet<String>,
}

impl NewUserForm {
    pub fn validate(self) -> Result<NewUser, String> {
        let email = self.email.trim().to_string();
        if !is_valid_email(&email) {
            return Err("Invalid email format".to_string());
        }

        if self.password.len() < MIN_PASSWORD_LENGTH {
            return Err(format!(
                "Password must be at least {} characters long",
                MIN_PASSWORD_LENGTH
            ));
        }

        Ok(NewUser {
            email,
            password: self.password,
            first_name: non_empty(self.first_name),
            last_name: non_empty(self.last_name),
            status: UserStatus::Active,
            privileges: parse_privileges(&self.privileges),
        })
    }
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    // Must have exactly one @ separating local and domain parts
    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 {
        return false;
    }

    let local = parts[0];
    let domain = parts[1];

    if local.is_empty() || !domain.contains('.') {
        return false;
    }

    // Domain must have characters around every dot
    let domain_parts: Vec<&str> = domain.split('.').collect();
    domain_parts.len() >= 2 && domain_parts.iter().all(|part| !part.is_empty())
}
