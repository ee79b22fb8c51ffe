use serde::{Deserialize, Serialize};

/// Account state of a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    Active,
    Pending,
    Locked,
}

impl UserStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserStatus::Active => "active",
            UserStatus::Pending => "pending",
            UserStatus::Locked => "locked",
        }
    }

    /// Returns a display-friendly version of the status with proper capitalization
    pub fn display_name(&self) -> &'static str {
        match self {
            UserStatus::Active => "Active",
            UserStatus::Pending => "Pending",
            UserStatus::Locked => "Locked",
        }
    }

    pub fn can_log_in(&self) -> bool {
        !matches!(self, UserStatus::Locked)
    }
}

impl std::fmt::Display for UserStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<String> for UserStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "pending" => UserStatus::Pending,
            "locked" => UserStatus::Locked,
            _ => UserStatus::Active,
        }
    }
}
