//! Authorization allow-list
//!
//! Parsed from the `ID:NAME:ROLE:PERMISSIONS;...` string carried in
//! configuration. Malformed entries are skipped with a warning rather than
//! failing the whole list.

use std::collections::HashMap;

use tracing::warn;

use super::types::{Permission, Role};

/// One allow-list entry
#[derive(Debug, Clone, PartialEq)]
pub struct WhitelistEntry {
    pub display_name: String,
    pub role: Role,
    pub permissions: Vec<Permission>,
}

/// The allow-list consulted before directory verification
#[derive(Debug, Clone, Default)]
pub struct Whitelist {
    entries: HashMap<String, WhitelistEntry>,
}

impl Whitelist {
    /// Parse from the semicolon-separated `ID:NAME:ROLE:PERMISSIONS` format.
    ///
    /// Permissions are comma-separated. Entries that do not have exactly
    /// four fields, or name an unknown role, are skipped.
    pub fn parse(raw: &str) -> Self {
        let mut entries = HashMap::new();

        for entry in raw.split(';') {
            let entry = entry.trim();
            if entry.is_empty() {
                continue;
            }

            let parts: Vec<&str> = entry.split(':').collect();
            if parts.len() != 4 {
                warn!(entry, "invalid whitelist entry, expected ID:NAME:ROLE:PERMISSIONS");
                continue;
            }

            let Some(role) = Role::parse(parts[2].trim()) else {
                warn!(entry, role = parts[2], "unknown role in whitelist entry");
                continue;
            };

            let permissions: Vec<Permission> = parts[3]
                .split(',')
                .filter_map(|p| Permission::parse(p.trim()))
                .collect();

            entries.insert(
                parts[0].trim().to_string(),
                WhitelistEntry {
                    display_name: parts[1].trim().to_string(),
                    role,
                    permissions,
                },
            );
        }

        Self { entries }
    }

    pub fn get(&self, subject_id: &str) -> Option<&WhitelistEntry> {
        self.entries.get(subject_id)
    }

    pub fn contains(&self, subject_id: &str) -> bool {
        self.entries.contains_key(subject_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
