//! Capability derivation.
//!
//! A capability type is a noun pair such as `post`/`posts`. Combined with a
//! permission spec it expands into the concrete capability strings the host
//! checks, e.g. `edit_others_posts` or `read_private_posts`.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::error::{Error, Result};
use crate::naming::{non_empty, pluralize};

/// The capability every role keeps. Without it a user has no backend at all.
pub const BASE_CAPABILITY: &str = "read";

/// Singular/plural noun pair substituted into capability templates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CapabilityType {
    pub singular: String,
    pub plural: String,
}

impl CapabilityType {
    /// Capability type from one noun; the plural appends `s`.
    pub fn new(noun: &str) -> Result<Self> {
        let noun = non_empty(noun, "capability type")?;
        Ok(Self {
            singular: noun.to_string(),
            plural: pluralize(noun),
        })
    }

    /// Capability type from an explicit noun pair.
    pub fn pair(singular: &str, plural: &str) -> Result<Self> {
        Ok(Self {
            singular: non_empty(singular, "capability type singular")?.to_string(),
            plural: non_empty(plural, "capability type plural")?.to_string(),
        })
    }
}

impl Default for CapabilityType {
    fn default() -> Self {
        Self {
            singular: "post".into(),
            plural: "posts".into(),
        }
    }
}

/// An action a permission spec grants.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Action {
    Read,
    Edit,
    Delete,
    /// Unrecognised key. Accepted and ignored during derivation.
    Other(String),
}

impl Action {
    /// Parse an action key, case-insensitively.
    ///
    /// `all` is not an action: inside a scoped map it is an unknown key and
    /// grants nothing. Use [`PermissionSpec::All`] for the full template.
    pub fn parse(key: &str) -> Self {
        match key.to_lowercase().as_str() {
            "read" => Self::Read,
            "edit" => Self::Edit,
            "delete" => Self::Delete,
            _ => Self::Other(key.to_string()),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read => f.write_str("read"),
            Self::Edit => f.write_str("edit"),
            Self::Delete => f.write_str("delete"),
            Self::Other(key) => f.write_str(key),
        }
    }
}

/// How far an action reaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    /// Own, private, and other users' content.
    All,
    /// Own and private content.
    Private,
    /// Own and other users' content.
    Others,
    /// Any other scope value: own content only.
    Own,
}

impl Scope {
    /// Parse a scope value, case-insensitively.
    pub fn parse(value: &str) -> Self {
        match value.to_lowercase().as_str() {
            "all" => Self::All,
            "private" => Self::Private,
            "others" => Self::Others,
            _ => Self::Own,
        }
    }
}

/// Insertion-ordered mapping from action to scope.
///
/// Inserting an action that is already present replaces its scope in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PermissionMap {
    entries: Vec<(Action, Scope)>,
}

impl PermissionMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, action: Action, scope: Scope) {
        match self.entries.iter_mut().find(|(a, _)| *a == action) {
            Some(entry) => entry.1 = scope,
            None => self.entries.push((action, scope)),
        }
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with(mut self, action: Action, scope: Scope) -> Self {
        self.insert(action, scope);
        self
    }

    pub fn get(&self, action: &Action) -> Option<Scope> {
        self.entries
            .iter()
            .find(|(a, _)| a == action)
            .map(|(_, scope)| *scope)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Action, Scope)> {
        self.entries.iter().map(|(action, scope)| (action, *scope))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(Action, Scope)> for PermissionMap {
    fn from_iter<I: IntoIterator<Item = (Action, Scope)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (action, scope) in iter {
            map.insert(action, scope);
        }
        map
    }
}

/// Which capabilities a role (or content type) should carry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PermissionSpec {
    /// Every capability of the capability type.
    #[default]
    All,
    /// Per-action scopes.
    Scoped(PermissionMap),
}

impl PermissionSpec {
    /// Shorthand for a scoped spec built from `(action, scope)` pairs.
    pub fn scoped<I: IntoIterator<Item = (Action, Scope)>>(entries: I) -> Self {
        Self::Scoped(entries.into_iter().collect())
    }

    /// Parse loosely-typed input.
    ///
    /// Accepts the string `"all"` or an object of action keys to scope
    /// strings. Arrays, other strings, and empty objects are rejected.
    pub fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::String(s) if s.eq_ignore_ascii_case("all") => Ok(Self::All),
            Value::Object(obj) if !obj.is_empty() => {
                // Index keys mean a list was passed where a mapping belongs.
                if obj.keys().all(|key| key.trim().parse::<u64>().is_ok()) {
                    return Err(invalid_permissions());
                }

                let mut map = PermissionMap::new();
                for (key, scope) in obj {
                    let scope = scope.as_str().ok_or_else(|| {
                        Error::invalid(format!("permission scope for '{key}' must be a string"))
                    })?;
                    map.insert(parse_action(key)?, Scope::parse(scope));
                }
                Ok(Self::Scoped(map))
            }
            _ => Err(invalid_permissions()),
        }
    }

    /// Check the shape invariants of the spec.
    pub fn validate(&self) -> Result<()> {
        match self {
            Self::All => Ok(()),
            Self::Scoped(map) if map.is_empty() => Err(invalid_permissions()),
            Self::Scoped(_) => Ok(()),
        }
    }
}

impl FromStr for PermissionSpec {
    type Err = Error;

    /// Parses `all` or a comma-separated `action=scope` list such as
    /// `read=all,edit=others`.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }

        let mut map = PermissionMap::new();
        for pair in s.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let Some((action, scope)) = pair.split_once('=') else {
                return Err(invalid_permissions());
            };
            map.insert(parse_action(action)?, Scope::parse(scope.trim()));
        }

        let spec = Self::Scoped(map);
        spec.validate()?;
        Ok(spec)
    }
}

fn parse_action(key: &str) -> Result<Action> {
    Ok(Action::parse(non_empty(key, "permission action")?.trim()))
}

fn invalid_permissions() -> Error {
    Error::invalid("permissions need to be \"all\" or a non-empty action => scope mapping")
}

/// Ordered, duplicate-free list of capability strings, `read` first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CapabilitySet {
    capabilities: Vec<String>,
}

impl CapabilitySet {
    /// The base set: just `read`.
    pub fn new() -> Self {
        Self {
            capabilities: vec![BASE_CAPABILITY.to_string()],
        }
    }

    /// Restore the base set.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Add a capability unless already present.
    pub fn insert(&mut self, capability: impl Into<String>) {
        let capability = capability.into();
        if !self.contains(&capability) {
            self.capabilities.push(capability);
        }
    }

    pub fn contains(&self, capability: &str) -> bool {
        self.capabilities.iter().any(|c| c == capability)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.capabilities.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.capabilities
    }

    pub fn len(&self) -> usize {
        self.capabilities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.capabilities.is_empty()
    }
}

impl Default for CapabilitySet {
    fn default() -> Self {
        Self::new()
    }
}

impl Extend<String> for CapabilitySet {
    fn extend<I: IntoIterator<Item = String>>(&mut self, iter: I) {
        for capability in iter {
            self.insert(capability);
        }
    }
}

/// Which noun of the pair a template substitutes.
#[derive(Clone, Copy)]
enum Noun {
    Singular,
    Plural,
}

use Noun::{Plural, Singular};

/// The full template, in registration order. Each entry is the generic
/// meta-capability name followed by the prefix and noun of the concrete one.
const ALL_TEMPLATE: [(&str, &str, Noun); 13] = [
    ("edit_post", "edit_", Singular),
    ("read_post", "read_", Singular),
    ("delete_post", "delete_", Singular),
    ("edit_posts", "edit_", Plural),
    ("edit_others_posts", "edit_others_", Plural),
    ("publish_posts", "publish_", Plural),
    ("read_private_posts", "read_private_", Plural),
    ("delete_posts", "delete_", Plural),
    ("delete_private_posts", "delete_private_", Plural),
    ("delete_published_posts", "delete_published_", Plural),
    ("delete_others_posts", "delete_others_", Plural),
    ("edit_private_posts", "edit_private_", Plural),
    ("edit_published_posts", "edit_published_", Plural),
];

fn expand(capability_type: &CapabilityType, templates: &[(&str, Noun)]) -> Vec<String> {
    templates
        .iter()
        .map(|(prefix, noun)| {
            let noun = match noun {
                Singular => &capability_type.singular,
                Plural => &capability_type.plural,
            };
            format!("{prefix}{noun}")
        })
        .collect()
}

fn action_templates(action: &Action, scope: Scope) -> Vec<(&'static str, Noun)> {
    match action {
        Action::Read => match scope {
            Scope::All => vec![("read_", Singular), ("read_private_", Plural)],
            _ => vec![("read_", Singular)],
        },
        Action::Edit => {
            let mut templates = vec![
                ("edit_", Singular),
                ("edit_", Plural),
                ("edit_published_", Plural),
            ];
            match scope {
                Scope::All => {
                    templates.extend([("edit_others_", Plural), ("edit_private_", Plural)]);
                }
                Scope::Private => templates.push(("edit_private_", Plural)),
                Scope::Others => templates.push(("edit_others_", Plural)),
                Scope::Own => {}
            }
            templates
        }
        Action::Delete => {
            let mut templates = vec![
                ("delete_", Singular),
                ("delete_", Plural),
                ("delete_published_", Plural),
            ];
            match scope {
                Scope::All => {
                    templates.extend([("delete_private_", Plural), ("delete_others_", Plural)]);
                }
                Scope::Private => templates.push(("delete_private_", Plural)),
                // Others scope of delete grants edit_others, not delete_others.
                Scope::Others => templates.push(("edit_others_", Plural)),
                Scope::Own => {}
            }
            templates
        }
        Action::Other(_) => Vec::new(),
    }
}

/// Derive the capability set for a capability type and permission spec.
///
/// The result always starts with `read`. `All` yields the full 13-entry
/// template; a scoped spec expands each action in insertion order.
/// Unrecognised actions contribute nothing.
pub fn derive(capability_type: &CapabilityType, spec: &PermissionSpec) -> Result<CapabilitySet> {
    spec.validate()?;

    let mut capabilities = CapabilitySet::new();
    match spec {
        PermissionSpec::All => {
            let templates: Vec<(&str, Noun)> = ALL_TEMPLATE
                .iter()
                .map(|(_, prefix, noun)| (*prefix, *noun))
                .collect();
            capabilities.extend(expand(capability_type, &templates));
        }
        PermissionSpec::Scoped(map) => {
            for (action, scope) in map.iter() {
                if let Action::Other(key) = action {
                    debug!(action = %key, "ignoring unrecognised permission action");
                }
                capabilities.extend(expand(capability_type, &action_templates(action, scope)));
            }
        }
    }

    debug!(
        capability_type = %capability_type.singular,
        count = capabilities.len(),
        "derived capabilities"
    );
    Ok(capabilities)
}

/// Meta-capability map for a content type: generic names such as
/// `edit_others_posts` mapped to the concrete capability of this type.
pub fn content_type_capabilities(capability_type: &CapabilityType) -> BTreeMap<String, String> {
    ALL_TEMPLATE
        .iter()
        .map(|(meta, prefix, noun)| {
            let concrete = expand(capability_type, &[(*prefix, *noun)]).concat();
            ((*meta).to_string(), concrete)
        })
        .collect()
}
