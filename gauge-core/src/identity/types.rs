//! Verified identity types

use serde::{Deserialize, Serialize};

/// Role granted to a verified subject
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Employee,
    Manager,
    Hr,
}

impl Role {
    /// Convert to directory string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Employee => "employee",
            Self::Manager => "manager",
            Self::Hr => "hr",
        }
    }

    /// Parse from directory string
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "employee" => Some(Self::Employee),
            "manager" => Some(Self::Manager),
            "hr" => Some(Self::Hr),
            _ => None,
        }
    }

    /// Reviewer roles may read scores and risk across sessions
    pub fn is_reviewer(&self) -> bool {
        matches!(self, Self::Manager | Self::Hr)
    }
}

/// Coarse permission flags carried alongside the role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    Read,
    Write,
    Admin,
}

impl Permission {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Write => "write",
            Self::Admin => "admin",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "read" => Some(Self::Read),
            "write" => Some(Self::Write),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }
}

/// A verified subject as returned by the identity gateway
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    pub subject_id: String,
    pub display_name: String,
    pub role: Role,
    pub permissions: Vec<Permission>,
}

impl Identity {
    pub fn new(subject_id: impl Into<String>, display_name: impl Into<String>, role: Role) -> Self {
        Self {
            subject_id: subject_id.into(),
            display_name: display_name.into(),
            role,
            permissions: vec![Permission::Read],
        }
    }

    pub fn with_permissions(mut self, permissions: Vec<Permission>) -> Self {
        self.permissions = permissions;
        self
    }

    pub fn has_permission(&self, permission: Permission) -> bool {
        self.permissions.contains(&permission)
    }
}
