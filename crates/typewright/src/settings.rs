//! Final registration settings and the option overlay merged into them.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::host::Translate;

/// Caller-supplied overrides, merged over computed defaults.
pub type DefinitionOptions = Map<String, Value>;

/// Recursively merge `overlay` into `base`.
///
/// - Objects merge per key.
/// - Scalars and arrays from the overlay replace the base value.
pub fn deep_merge(base: &mut Value, overlay: &Value) {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            for (key, overlay_val) in overlay_map {
                if let Some(base_val) = base_map.get_mut(key) {
                    deep_merge(base_val, overlay_val);
                } else {
                    base_map.insert(key.clone(), overlay_val.clone());
                }
            }
        }
        (base, overlay) => {
            *base = overlay.clone();
        }
    }
}

/// Parse a `key=json` option. Dotted keys build nested objects, so
/// `rewrite.slug="novels"` becomes `{"rewrite": {"slug": "novels"}}`.
/// A value that is not valid JSON is taken as a plain string.
pub fn parse_option(raw: &str) -> Result<(String, Value)> {
    let Some((path, value)) = raw.split_once('=') else {
        return Err(Error::invalid(format!("option '{raw}' must be key=value")));
    };

    let mut keys = path.split('.').map(str::trim).rev();
    let leaf = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));

    let Some(last) = keys.next().filter(|k| !k.is_empty()) else {
        return Err(Error::invalid(format!("option '{raw}' has an empty key")));
    };

    let mut nested = leaf;
    let mut top = last.to_string();
    for key in keys {
        if key.is_empty() {
            return Err(Error::invalid(format!("option '{raw}' has an empty key")));
        }
        let mut map = Map::new();
        map.insert(top, nested);
        nested = Value::Object(map);
        top = key.to_string();
    }

    Ok((top, nested))
}

/// Merge a parsed option into an options overlay.
pub fn merge_option(options: &mut DefinitionOptions, key: String, value: Value) {
    match options.get_mut(&key) {
        Some(existing) => deep_merge(existing, &value),
        None => {
            options.insert(key, value);
        }
    }
}

/// Translate a phrase pattern and substitute `%s` with `name`.
pub(crate) fn label<T: Translate + ?Sized>(
    translator: &T,
    pattern: &str,
    name: &str,
    domain: &str,
) -> String {
    translator.translate(pattern, domain).replace("%s", name)
}

/// URL rewrite rules shared by content types and taxonomies.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct Rewrite {
    pub slug: String,
    pub with_front: bool,
    pub feeds: bool,
    pub pages: bool,
}

impl Rewrite {
    pub fn new(slug: &str) -> Self {
        Self {
            slug: slug.to_string(),
            with_front: false,
            feeds: false,
            pages: true,
        }
    }
}

/// The merged settings object handed to the host.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FinalSettings(Map<String, Value>);

impl FinalSettings {
    /// Serialize `defaults` and merge `options` over them.
    pub(crate) fn merge<T: Serialize>(defaults: &T, options: &DefinitionOptions) -> Result<Self> {
        let mut value = serde_json::to_value(defaults)
            .map_err(|e| Error::invalid(format!("failed to serialize defaults: {e}")))?;
        deep_merge(&mut value, &Value::Object(options.clone()));

        match value {
            Value::Object(map) => Ok(Self(map)),
            _ => Err(Error::invalid("settings must serialize to an object")),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Look up a nested value by JSON pointer, e.g. `/rewrite/slug`.
    pub fn pointer(&self, pointer: &str) -> Option<&Value> {
        let mut parts = pointer.trim_start_matches('/').splitn(2, '/');
        let first = self.0.get(parts.next()?)?;
        match parts.next() {
            Some(rest) => first.pointer(&format!("/{rest}")),
            None => Some(first),
        }
    }

    /// A label by key, e.g. `name` or `add_new_item`.
    pub fn label(&self, key: &str) -> Option<&str> {
        self.0.get("labels")?.get(key)?.as_str()
    }

    pub fn rewrite_slug(&self) -> Option<&str> {
        self.0.get("rewrite")?.get("slug")?.as_str()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.0.clone())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deep_merge_replaces_scalars_and_merges_objects() {
        let mut base = json!({
            "public": true,
            "supports": ["title", "editor"],
            "rewrite": {"slug": "book", "feeds": false}
        });
        let overlay = json!({
            "public": false,
            "supports": ["title"],
            "rewrite": {"slug": "novels"},
            "menu_icon": "dashicons-book"
        });

        deep_merge(&mut base, &overlay);

        assert_eq!(
            base,
            json!({
                "public": false,
                "supports": ["title"],
                "rewrite": {"slug": "novels", "feeds": false},
                "menu_icon": "dashicons-book"
            })
        );
    }

    #[test]
    fn parse_option_builds_nested_objects() {
        let (key, value) = parse_option("rewrite.slug=\"novels\"").unwrap();
        assert_eq!(key, "rewrite");
        assert_eq!(value, json!({"slug": "novels"}));

        let (key, value) = parse_option("menu_position=20").unwrap();
        assert_eq!(key, "menu_position");
        assert_eq!(value, json!(20));

        let (_, value) = parse_option("menu_icon=dashicons-book").unwrap();
        assert_eq!(value, json!("dashicons-book"));
    }

    #[test]
    fn parse_option_rejects_malformed_input() {
        assert!(parse_option("public").is_err());
        assert!(parse_option("=true").is_err());
        assert!(parse_option("rewrite..slug=x").is_err());
    }

    #[test]
    fn merge_option_combines_siblings() {
        let mut options = DefinitionOptions::new();
        let (k, v) = parse_option("rewrite.slug=\"novels\"").unwrap();
        merge_option(&mut options, k, v);
        let (k, v) = parse_option("rewrite.feeds=true").unwrap();
        merge_option(&mut options, k, v);

        assert_eq!(
            Value::Object(options),
            json!({"rewrite": {"slug": "novels", "feeds": true}})
        );
    }

    #[test]
    fn pointer_reaches_nested_values() {
        let defaults = json!({"rewrite": {"slug": "book"}, "public": true});
        let settings = FinalSettings::merge(&defaults, &DefinitionOptions::new()).unwrap();
        assert_eq!(settings.pointer("/rewrite/slug"), Some(&json!("book")));
        assert_eq!(settings.pointer("/public"), Some(&json!(true)));
        assert_eq!(settings.pointer("/missing"), None);
        assert_eq!(settings.rewrite_slug(), Some("book"));
    }
}
