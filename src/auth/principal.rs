use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Privilege tag that satisfies every requirement.
pub const SUPER_PRIVILEGE: &str = "all";

/// Suffix marking a tag as a grant over a whole namespace (`user.*`).
const WILDCARD_SUFFIX: &str = ".*";

/// The authenticated requester.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub id: i64,
    pub email: String,
    privileges: BTreeSet<String>,
}

impl Principal {
    pub fn new<I, S>(id: i64, email: impl Into<String>, privileges: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id,
            email: email.into(),
            privileges: privileges.into_iter().map(Into::into).collect(),
        }
    }

    pub fn privileges(&self) -> &BTreeSet<String> {
        &self.privileges
    }

    pub fn has_privilege(&self, tag: &str) -> bool {
        self.privileges.contains(tag)
    }

    /// Whether any granted tag covers `requirement`.
    pub fn satisfies(&self, requirement: &PrivilegeRequirement) -> bool {
        if self.has_privilege(SUPER_PRIVILEGE) {
            return true;
        }
        if requirement.is_super() {
            return false;
        }

        let required = requirement.as_str();
        self.privileges.iter().any(|granted| {
            granted == required
                || granted
                    .strip_suffix(WILDCARD_SUFFIX)
                    .is_some_and(|namespace| {
                        required
                            .strip_prefix(namespace)
                            .is_some_and(|rest| rest.starts_with('.'))
                    })
        })
    }
}

/// The privilege an action needs.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PrivilegeRequirement(String);

impl PrivilegeRequirement {
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    pub fn super_user() -> Self {
        Self(SUPER_PRIVILEGE.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_super(&self) -> bool {
        self.0 == SUPER_PRIVILEGE
    }
}

impl fmt::Display for PrivilegeRequirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Splits a comma or whitespace separated privilege list into tags.
pub fn parse_privileges(input: &str) -> BTreeSet<String> {
    input
        .split(|c: char| c == ',' || c.is_whitespace())
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}
