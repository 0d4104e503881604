//! CLI command implementations.
//!
//! Each command builds a definition from its arguments and renders the
//! result as JSON without touching a host.

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;

use crate::capability::{self, CapabilityType, PermissionSpec};
use crate::config::Config;
use crate::content_type::ContentTypeDefinition;
use crate::role::RoleDefinition;
use crate::settings::{DefinitionOptions, merge_option, parse_option};
use crate::taxonomy::TaxonomyDefinition;

/// Build an option overlay from `key=json` arguments.
pub fn parse_options(raw: &[String]) -> Result<DefinitionOptions> {
    let mut options = DefinitionOptions::new();
    for option in raw {
        let (key, value) =
            parse_option(option).with_context(|| format!("invalid --option '{option}'"))?;
        merge_option(&mut options, key, value);
    }
    Ok(options)
}

/// Capability type from a noun and an optional explicit plural.
pub fn capability_type(noun: &str, plural: Option<&str>) -> Result<CapabilityType> {
    let capability_type = match plural {
        Some(plural) => CapabilityType::pair(noun, plural)?,
        None => CapabilityType::new(noun)?,
    };
    Ok(capability_type)
}

fn render<T: Serialize>(value: &T, config: &Config) -> Result<String> {
    let out = if config.pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    out.context("failed to serialize output")
}

/// Plan a content type and render its final settings.
pub fn cmd_plan_content_type(
    names: &[String],
    capability_type: Option<CapabilityType>,
    options: &[String],
    config: &Config,
) -> Result<String> {
    let mut definition = ContentTypeDefinition::with_options(names, parse_options(options)?)
        .context("invalid content type definition")?;
    if let Some(capability_type) = capability_type {
        definition.set_capability_type(capability_type);
    }

    let settings = definition.finalize()?;
    let out = serde_json::json!({
        "names": definition.names(),
        "settings": settings,
    });
    render(&out, config)
}

/// Plan a taxonomy and render its final settings.
pub fn cmd_plan_taxonomy(
    names: &[String],
    post_types: &[String],
    options: &[String],
    config: &Config,
) -> Result<String> {
    let definition = TaxonomyDefinition::with_options(names, post_types, parse_options(options)?)
        .context("invalid taxonomy definition")?;

    let settings = definition.finalize()?;
    let out = serde_json::json!({
        "db_name": definition.db_name(),
        "post_types": definition.post_types(),
        "settings": settings,
    });
    render(&out, config)
}

/// Derive and render the capabilities for a capability type.
pub fn cmd_capabilities(
    capability_type: &CapabilityType,
    permissions: &PermissionSpec,
    config: &Config,
) -> Result<String> {
    let capabilities = capability::derive(capability_type, permissions)?;
    render(&capabilities, config)
}

/// Describe a role: its names, derived capabilities, and grant targets.
pub fn cmd_role(
    names: &[String],
    capability_type: CapabilityType,
    permissions: PermissionSpec,
    config: &Config,
) -> Result<String> {
    let mut role = RoleDefinition::new(names, capability_type, permissions)
        .context("invalid role definition")?;
    config.apply_to(&mut role)?;

    let out = serde_json::json!({
        "role_name": role.role_name(),
        "display_name": role.display_name(),
        "capability_type": role.capability_type(),
        "capabilities": role.capabilities(),
        "bootstrap_roles": role.bootstrap_roles(),
    });
    render(&out, config)
}

/// Parse CLI output back into JSON.
pub fn parse_output(output: &str) -> Result<Value> {
    serde_json::from_str(output).context("output is not valid JSON")
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn plan_content_type_applies_options() {
        let out = cmd_plan_content_type(
            &strings(&["Book"]),
            Some(CapabilityType::new("book").unwrap()),
            &strings(&["rewrite.slug=\"novels\"", "menu_position=20"]),
            &Config::default(),
        )
        .unwrap();

        let value = parse_output(&out).unwrap();
        assert_eq!(value["names"]["db_name"], json!("book"));
        assert_eq!(value["names"]["plural"], json!("Books"));
        assert_eq!(value["settings"]["rewrite"]["slug"], json!("novels"));
        assert_eq!(value["settings"]["menu_position"], json!(20));
        assert_eq!(
            value["settings"]["capabilities"]["edit_posts"],
            json!("edit_books")
        );
    }

    #[test]
    fn plan_taxonomy_requires_post_types() {
        let err = cmd_plan_taxonomy(&strings(&["Genre"]), &[], &[], &Config::default());
        assert!(err.is_err());

        let out = cmd_plan_taxonomy(
            &strings(&["Genre"]),
            &strings(&["book"]),
            &[],
            &Config::default(),
        )
        .unwrap();
        let value = parse_output(&out).unwrap();
        assert_eq!(value["post_types"], json!(["book"]));
        assert_eq!(value["settings"]["labels"]["name"], json!("Genres"));
    }

    #[test]
    fn capabilities_render_as_list() {
        let config = Config {
            pretty: false,
            ..Config::default()
        };
        let out = cmd_capabilities(
            &CapabilityType::new("widget").unwrap(),
            &"read=all".parse().unwrap(),
            &config,
        )
        .unwrap();
        assert_eq!(out, r#"["read","read_widget","read_private_widgets"]"#);
    }

    #[test]
    fn role_uses_configured_bootstrap_roles() {
        let config = Config {
            bootstrap_roles: strings(&["administrator"]),
            ..Config::default()
        };
        let out = cmd_role(
            &strings(&["Editor Plus"]),
            CapabilityType::new("post").unwrap(),
            "delete=all".parse().unwrap(),
            &config,
        )
        .unwrap();

        let value = parse_output(&out).unwrap();
        assert_eq!(value["role_name"], json!("editor_plus"));
        assert_eq!(
            value["capability_type"],
            json!({"singular": "post", "plural": "posts"})
        );
        assert_eq!(value["capabilities"].as_array().unwrap().len(), 6);
        assert_eq!(value["bootstrap_roles"], json!(["administrator"]));
    }

    #[test]
    fn bad_option_is_reported() {
        let err = parse_options(&strings(&["public"])).unwrap_err();
        assert!(err.to_string().contains("public"));
    }
}
