//! The host platform surface definitions register against.
//!
//! The host owns storage for content types, taxonomies, and roles. This
//! crate only calls into it; every mutating call may fail, and failures are
//! surfaced to callers as [`Error::HostRegistration`](crate::Error).

use serde_json::Value;

/// String translation for user-facing labels.
pub trait Translate {
    /// Translate `text` within `domain`. Implementations that have no
    /// translation for `text` return it unchanged.
    fn translate(&self, text: &str, domain: &str) -> String;
}

/// Passthrough translator.
#[derive(Debug, Clone, Copy, Default)]
pub struct Identity;

impl Translate for Identity {
    fn translate(&self, text: &str, _domain: &str) -> String {
        text.to_string()
    }
}

/// Registration and access-control calls provided by the host.
pub trait Host: Translate {
    /// Whether a content type with this machine name is registered.
    fn type_exists(&self, db_name: &str) -> bool;

    /// Whether a taxonomy with this machine name is registered.
    fn taxonomy_exists(&self, db_name: &str) -> bool;

    fn register_content_type(&mut self, db_name: &str, settings: &Value) -> anyhow::Result<()>;

    fn register_taxonomy(
        &mut self,
        db_name: &str,
        post_types: &[String],
        settings: &Value,
    ) -> anyhow::Result<()>;

    /// Whether a role with this machine name exists.
    fn role_exists(&self, role: &str) -> bool;

    fn add_role(
        &mut self,
        role: &str,
        display_name: &str,
        capabilities: &[String],
    ) -> anyhow::Result<()>;

    fn remove_role(&mut self, role: &str) -> anyhow::Result<()>;

    fn add_capability(&mut self, role: &str, capability: &str) -> anyhow::Result<()>;

    fn remove_capability(&mut self, role: &str, capability: &str) -> anyhow::Result<()>;
}
