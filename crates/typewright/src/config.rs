//! Configuration loaded from environment variables.

use std::env;

use anyhow::{Context, Result, bail};

use crate::role::{DEFAULT_BOOTSTRAP_ROLES, RoleDefinition};

/// Runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Roles that receive grants alongside a defined role
    /// (TYPEWRIGHT_BOOTSTRAP_ROLES, comma-separated, default:
    /// administrator,editor,author).
    pub bootstrap_roles: Vec<String>,

    /// Fallback tracing filter when RUST_LOG is unset (TYPEWRIGHT_LOG,
    /// default: info).
    pub log_filter: String,

    /// Pretty-print JSON output (TYPEWRIGHT_PRETTY, default: true).
    pub pretty: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bootstrap_roles: DEFAULT_BOOTSTRAP_ROLES.map(String::from).into(),
            log_filter: "info".to_string(),
            pretty: true,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let bootstrap_roles = match lookup("TYPEWRIGHT_BOOTSTRAP_ROLES") {
            Some(raw) => {
                let roles: Vec<String> = raw
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(String::from)
                    .collect();
                if roles.is_empty() {
                    bail!("TYPEWRIGHT_BOOTSTRAP_ROLES must name at least one role");
                }
                roles
            }
            None => defaults.bootstrap_roles,
        };

        let log_filter = lookup("TYPEWRIGHT_LOG").unwrap_or(defaults.log_filter);

        let pretty = match lookup("TYPEWRIGHT_PRETTY") {
            Some(raw) => raw
                .trim()
                .parse()
                .context("TYPEWRIGHT_PRETTY must be true or false")?,
            None => defaults.pretty,
        };

        Ok(Self {
            bootstrap_roles,
            log_filter,
            pretty,
        })
    }

    /// Apply the configured bootstrap roles to a role definition.
    pub fn apply_to(&self, role: &mut RoleDefinition) -> crate::Result<()> {
        role.set_bootstrap_roles(&self.bootstrap_roles)?;
        Ok(())
    }
}
