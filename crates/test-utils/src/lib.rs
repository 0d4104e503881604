//! Typewright test utilities.
//!
//! An in-memory [`Host`] that records every call, plus fixtures and JSON
//! assertion helpers for integration tests.

use std::collections::{BTreeMap, HashMap, HashSet};

use anyhow::bail;
use serde_json::Value;
use typewright::capability::{Action, CapabilityType, PermissionSpec, Scope};
use typewright::{Host, RoleDefinition, Translate};

/// A host call, in the order it was made.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostCall {
    RegisterContentType(String),
    RegisterTaxonomy(String, Vec<String>),
    AddRole(String),
    RemoveRole(String),
    AddCapability(String, String),
    RemoveCapability(String, String),
}

/// Host operations that can be made to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    RegisterContentType,
    RegisterTaxonomy,
    AddRole,
    RemoveRole,
    AddCapability,
    RemoveCapability,
}

/// A role as stored by [`MemoryHost`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryRole {
    pub display_name: String,
    pub capabilities: Vec<String>,
}

impl MemoryRole {
    pub fn has(&self, capability: &str) -> bool {
        self.capabilities.iter().any(|c| c == capability)
    }
}

/// In-memory host registry.
#[derive(Debug, Default)]
pub struct MemoryHost {
    pub content_types: BTreeMap<String, Value>,
    pub taxonomies: BTreeMap<String, (Vec<String>, Value)>,
    pub roles: BTreeMap<String, MemoryRole>,
    pub calls: Vec<HostCall>,
    translations: HashMap<String, String>,
    failing: HashSet<Operation>,
}

impl MemoryHost {
    /// An empty host with no roles.
    pub fn new() -> Self {
        Self::default()
    }

    /// A host with the bootstrap roles already installed, each holding `read`.
    pub fn with_bootstrap_roles() -> Self {
        let mut host = Self::new();
        for role in ["administrator", "editor", "author"] {
            host = host.with_role(role, &["read"]);
        }
        host
    }

    /// Add a pre-existing role.
    pub fn with_role(mut self, name: &str, capabilities: &[&str]) -> Self {
        self.roles.insert(
            name.to_string(),
            MemoryRole {
                display_name: name.to_string(),
                capabilities: capabilities.iter().map(|c| c.to_string()).collect(),
            },
        );
        self
    }

    /// Add a pre-registered content type.
    pub fn with_content_type(mut self, db_name: &str) -> Self {
        self.content_types
            .insert(db_name.to_string(), Value::Object(Default::default()));
        self
    }

    /// Add a pre-registered taxonomy.
    pub fn with_taxonomy(mut self, db_name: &str) -> Self {
        self.taxonomies.insert(
            db_name.to_string(),
            (Vec::new(), Value::Object(Default::default())),
        );
        self
    }

    /// Translate `text` to `translated` in every domain.
    pub fn with_translation(mut self, text: &str, translated: &str) -> Self {
        self.translations
            .insert(text.to_string(), translated.to_string());
        self
    }

    /// Make every call of `operation` fail.
    pub fn failing(mut self, operation: Operation) -> Self {
        self.failing.insert(operation);
        self
    }

    pub fn role(&self, name: &str) -> Option<&MemoryRole> {
        self.roles.get(name)
    }

    /// Whether any mutating call has been made.
    pub fn untouched(&self) -> bool {
        self.calls.is_empty()
    }

    fn check(&self, operation: Operation) -> anyhow::Result<()> {
        if self.failing.contains(&operation) {
            bail!("{operation:?} rejected by test host");
        }
        Ok(())
    }

    fn role_mut(&mut self, role: &str) -> anyhow::Result<&mut MemoryRole> {
        match self.roles.get_mut(role) {
            Some(role) => Ok(role),
            None => bail!("no such role '{role}'"),
        }
    }
}

impl Translate for MemoryHost {
    fn translate(&self, text: &str, _domain: &str) -> String {
        self.translations
            .get(text)
            .cloned()
            .unwrap_or_else(|| text.to_string())
    }
}

impl Host for MemoryHost {
    fn type_exists(&self, db_name: &str) -> bool {
        self.content_types.contains_key(db_name)
    }

    fn taxonomy_exists(&self, db_name: &str) -> bool {
        self.taxonomies.contains_key(db_name)
    }

    fn register_content_type(&mut self, db_name: &str, settings: &Value) -> anyhow::Result<()> {
        self.check(Operation::RegisterContentType)?;
        self.calls
            .push(HostCall::RegisterContentType(db_name.to_string()));
        self.content_types
            .insert(db_name.to_string(), settings.clone());
        Ok(())
    }

    fn register_taxonomy(
        &mut self,
        db_name: &str,
        post_types: &[String],
        settings: &Value,
    ) -> anyhow::Result<()> {
        self.check(Operation::RegisterTaxonomy)?;
        self.calls.push(HostCall::RegisterTaxonomy(
            db_name.to_string(),
            post_types.to_vec(),
        ));
        self.taxonomies
            .insert(db_name.to_string(), (post_types.to_vec(), settings.clone()));
        Ok(())
    }

    fn role_exists(&self, role: &str) -> bool {
        self.roles.contains_key(role)
    }

    fn add_role(
        &mut self,
        role: &str,
        display_name: &str,
        capabilities: &[String],
    ) -> anyhow::Result<()> {
        self.check(Operation::AddRole)?;
        self.calls.push(HostCall::AddRole(role.to_string()));
        self.roles.insert(
            role.to_string(),
            MemoryRole {
                display_name: display_name.to_string(),
                capabilities: capabilities.to_vec(),
            },
        );
        Ok(())
    }

    fn remove_role(&mut self, role: &str) -> anyhow::Result<()> {
        self.check(Operation::RemoveRole)?;
        self.calls.push(HostCall::RemoveRole(role.to_string()));
        self.roles.remove(role);
        Ok(())
    }

    fn add_capability(&mut self, role: &str, capability: &str) -> anyhow::Result<()> {
        self.check(Operation::AddCapability)?;
        self.calls.push(HostCall::AddCapability(
            role.to_string(),
            capability.to_string(),
        ));
        let stored = self.role_mut(role)?;
        if !stored.has(capability) {
            stored.capabilities.push(capability.to_string());
        }
        Ok(())
    }

    fn remove_capability(&mut self, role: &str, capability: &str) -> anyhow::Result<()> {
        self.check(Operation::RemoveCapability)?;
        self.calls.push(HostCall::RemoveCapability(
            role.to_string(),
            capability.to_string(),
        ));
        self.role_mut(role)?.capabilities.retain(|c| c != capability);
        Ok(())
    }
}

/// A role over `noun` with a single `action => scope` permission.
pub fn test_role(name: &str, noun: &str, action: Action, scope: Scope) -> RoleDefinition {
    let role = CapabilityType::new(noun).and_then(|capability_type| {
        RoleDefinition::new(
            &[name],
            capability_type,
            PermissionSpec::scoped([(action, scope)]),
        )
    });
    match role {
        Ok(role) => role,
        Err(e) => panic!("test role '{name}' is invalid: {e}"),
    }
}

/// Assertion helpers for JSON settings.
pub mod assert {
    use serde_json::Value;

    /// Assert that a JSON value has a specific key.
    pub fn has_key(value: &Value, key: &str) {
        assert!(
            value.get(key).is_some(),
            "Expected JSON to have key '{key}', got: {value}"
        );
    }

    /// Assert that the value at a JSON pointer equals `expected`.
    pub fn at(value: &Value, pointer: &str, expected: &Value) {
        let actual = value.pointer(pointer);
        assert_eq!(
            actual,
            Some(expected),
            "JSON mismatch at {pointer}\nactual: {}\nexpected: {expected}",
            actual.map(Value::to_string).unwrap_or_else(|| "<missing>".into()),
        );
    }

    /// Assert that a string contains a substring.
    pub fn contains(haystack: &str, needle: &str) {
        assert!(
            haystack.contains(needle),
            "Expected string to contain '{needle}'\nActual: {haystack}"
        );
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn memory_host_tracks_roles_and_capabilities() {
        let mut host = MemoryHost::new().with_role("editor", &["read"]);
        host.add_capability("editor", "edit_books").unwrap();
        host.add_capability("editor", "edit_books").unwrap();
        assert_eq!(host.role("editor").unwrap().capabilities, ["read", "edit_books"]);

        host.remove_capability("editor", "edit_books").unwrap();
        assert!(!host.role("editor").unwrap().has("edit_books"));
        assert!(host.add_capability("ghost", "read").is_err());
    }

    #[test]
    fn failing_operations_are_rejected() {
        let mut host = MemoryHost::new().failing(Operation::RegisterContentType);
        let err = host.register_content_type("book", &json!({})).unwrap_err();
        assert::contains(&err.to_string(), "RegisterContentType");
        assert!(host.untouched());
    }

    #[test]
    fn translations_fall_back_to_input() {
        let host = MemoryHost::new().with_translation("Edit %s", "Modifier %s");
        assert_eq!(host.translate("Edit %s", "book"), "Modifier %s");
        assert_eq!(host.translate("View %s", "book"), "View %s");
    }

    #[test]
    fn test_role_fixture() {
        let role = test_role("Reviewer", "book", Action::Read, Scope::All);
        assert_eq!(role.role_name(), "reviewer");
        assert!(role.capabilities().contains("read_private_books"));
    }

    #[test]
    fn pointer_assertion() {
        let value = json!({"rewrite": {"slug": "book"}});
        assert::has_key(&value, "rewrite");
        assert::at(&value, "/rewrite/slug", &json!("book"));
    }
}
