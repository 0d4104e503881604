//! Content type definitions.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{debug, info};

use crate::capability::{self, CapabilityType};
use crate::error::{Error, Result};
use crate::host::{Host, Identity, Translate};
use crate::lifecycle::{InitPhase, Registration};
use crate::naming::{NamePack, non_empty};
use crate::settings::{DefinitionOptions, FinalSettings, Rewrite, label};

/// Singular name used when no names are supplied.
pub const DEFAULT_SINGULAR: &str = "Custom Post Type";

/// Icon reported when none has been set.
pub const DEFAULT_MENU_ICON: &str = "dashicons-admin-post";

const ICON_PREFIX: &str = "dashicons-";

/// Declarative description of one content type.
///
/// Setters validate their input and leave the definition unchanged on
/// failure. [`finalize`](Self::finalize) computes the settings without
/// touching a host; [`create`](Self::create) schedules registration for the
/// host's init phase.
#[derive(Debug, Clone)]
pub struct ContentTypeDefinition {
    names: NamePack,
    options: DefinitionOptions,
    menu_icon: Option<String>,
    supports: Vec<String>,
    taxonomies: Vec<String>,
    menu_position: i32,
    public: bool,
    has_archive: bool,
    show_in_rest: bool,
    capability_type: CapabilityType,
    capabilities: BTreeMap<String, String>,
}

#[derive(Serialize)]
struct ContentTypeLabels {
    name: String,
    singular_name: String,
    menu_name: String,
    all_items: String,
    add_new: String,
    add_new_item: String,
    edit_item: String,
    new_item: String,
    view_item: String,
    search_items: String,
    not_found: String,
    not_found_in_trash: String,
    parent_item_colon: String,
}

#[derive(Serialize)]
struct ContentTypeDefaults<'a> {
    labels: ContentTypeLabels,
    menu_icon: Option<&'a str>,
    supports: &'a [String],
    taxonomies: &'a [String],
    menu_position: i32,
    public: bool,
    show_ui: bool,
    show_in_menu: bool,
    show_in_rest: bool,
    publicly_queryable: bool,
    exclude_from_search: bool,
    has_archive: bool,
    query_var: bool,
    can_export: bool,
    rewrite: Rewrite,
    capability_type: [&'a str; 2],
    capabilities: &'a BTreeMap<String, String>,
}

impl ContentTypeDefinition {
    /// Create a definition from up to four names (singular, plural, slug,
    /// db name) with no option overrides.
    pub fn new<S: AsRef<str>>(names: &[S]) -> Result<Self> {
        Self::with_options(names, DefinitionOptions::new())
    }

    /// Create a definition with an option overlay.
    pub fn with_options<S: AsRef<str>>(names: &[S], options: DefinitionOptions) -> Result<Self> {
        let capability_type = CapabilityType::default();
        Ok(Self {
            names: NamePack::derive(names, DEFAULT_SINGULAR)?,
            options,
            menu_icon: None,
            supports: ["title", "editor", "thumbnail", "author"]
                .map(String::from)
                .into(),
            taxonomies: Vec::new(),
            menu_position: 5,
            public: true,
            has_archive: true,
            show_in_rest: true,
            capabilities: capability::content_type_capabilities(&capability_type),
            capability_type,
        })
    }

    pub fn names(&self) -> &NamePack {
        &self.names
    }

    pub fn singular(&self) -> &str {
        self.names.singular()
    }

    pub fn set_singular(&mut self, singular: &str) -> Result<&mut Self> {
        self.names.set_singular(singular)?;
        Ok(self)
    }

    pub fn plural(&self) -> &str {
        self.names.plural()
    }

    pub fn set_plural(&mut self, plural: &str) -> Result<&mut Self> {
        self.names.set_plural(plural)?;
        Ok(self)
    }

    pub fn slug(&self) -> &str {
        self.names.slug()
    }

    pub fn set_slug(&mut self, slug: &str) -> Result<&mut Self> {
        self.names.set_slug(slug)?;
        Ok(self)
    }

    pub fn db_name(&self) -> &str {
        self.names.db_name()
    }

    pub fn set_db_name(&mut self, db_name: &str) -> Result<&mut Self> {
        self.names.set_db_name(db_name)?;
        Ok(self)
    }

    /// The menu icon, or [`DEFAULT_MENU_ICON`] when unset.
    pub fn menu_icon(&self) -> &str {
        self.menu_icon.as_deref().unwrap_or(DEFAULT_MENU_ICON)
    }

    /// Set the menu icon. `blank` clears it; names without the
    /// `dashicons-` prefix get it prepended.
    pub fn set_menu_icon(&mut self, icon: &str) -> Result<&mut Self> {
        let icon = non_empty(icon, "content type menu icon")?;
        self.menu_icon = Some(if icon == "blank" {
            String::new()
        } else if icon.starts_with(ICON_PREFIX) {
            icon.to_string()
        } else {
            format!("{ICON_PREFIX}{icon}")
        });
        Ok(self)
    }

    pub fn supports(&self) -> &[String] {
        &self.supports
    }

    pub fn set_supports<I, S>(&mut self, supports: I) -> Result<&mut Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.supports = non_empty_list(supports, "content type supported features")?;
        Ok(self)
    }

    /// Set supported features from a comma-separated list.
    pub fn set_supports_str(&mut self, supports: &str) -> Result<&mut Self> {
        self.set_supports(split_list(supports))
    }

    pub fn taxonomies(&self) -> &[String] {
        &self.taxonomies
    }

    pub fn set_taxonomies<I, S>(&mut self, taxonomies: I) -> Result<&mut Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.taxonomies = non_empty_list(taxonomies, "content type taxonomies")?;
        Ok(self)
    }

    /// Set attached taxonomies from a comma-separated list.
    pub fn set_taxonomies_str(&mut self, taxonomies: &str) -> Result<&mut Self> {
        self.set_taxonomies(split_list(taxonomies))
    }

    pub fn menu_position(&self) -> i32 {
        self.menu_position
    }

    pub fn set_menu_position(&mut self, position: i32) -> Result<&mut Self> {
        if position < 0 {
            return Err(Error::invalid(format!(
                "content type menu position must not be negative, got {position}"
            )));
        }
        self.menu_position = position;
        Ok(self)
    }

    pub fn is_public(&self) -> bool {
        self.public
    }

    pub fn set_public(&mut self, public: bool) -> &mut Self {
        self.public = public;
        self
    }

    pub fn has_archive(&self) -> bool {
        self.has_archive
    }

    pub fn set_has_archive(&mut self, has_archive: bool) -> &mut Self {
        self.has_archive = has_archive;
        self
    }

    pub fn show_in_rest(&self) -> bool {
        self.show_in_rest
    }

    pub fn set_show_in_rest(&mut self, show_in_rest: bool) -> &mut Self {
        self.show_in_rest = show_in_rest;
        self
    }

    pub fn capability_type(&self) -> &CapabilityType {
        &self.capability_type
    }

    /// Set the capability type and regenerate the capability map.
    pub fn set_capability_type(&mut self, capability_type: CapabilityType) -> &mut Self {
        self.capabilities = capability::content_type_capabilities(&capability_type);
        self.capability_type = capability_type;
        self
    }

    /// Generic meta-capability name to the concrete capability of this type.
    pub fn capabilities(&self) -> &BTreeMap<String, String> {
        &self.capabilities
    }

    /// Always fails: capabilities are generated from the capability type.
    pub fn set_capabilities(&mut self, _capabilities: BTreeMap<String, String>) -> Result<&mut Self> {
        Err(Error::invalid(
            "content type capabilities cannot be set directly; use set_capability_type() to generate them",
        ))
    }

    pub fn options(&self) -> &DefinitionOptions {
        &self.options
    }

    /// Replace the option overlay.
    pub fn set_options(&mut self, options: DefinitionOptions) -> &mut Self {
        self.options = options;
        self
    }

    /// Settings with labels left untranslated.
    pub fn finalize(&self) -> Result<FinalSettings> {
        self.plan(&Identity)
    }

    /// Compute the settings that will be registered: defaults derived from
    /// the names and flags, with the option overlay merged recursively on top.
    pub fn plan<T: Translate + ?Sized>(&self, translator: &T) -> Result<FinalSettings> {
        let singular = self.names.singular();
        let plural = self.names.plural();
        let domain = self.names.slug();
        let t = |pattern: &str, name: &str| label(translator, pattern, name, domain);

        let labels = ContentTypeLabels {
            name: t("%s", plural),
            singular_name: t("%s", singular),
            menu_name: t("%s", plural),
            all_items: t("%s", plural),
            add_new: t("Add New", ""),
            add_new_item: t("Add New %s", singular),
            edit_item: t("Edit %s", singular),
            new_item: t("New %s", singular),
            view_item: t("View %s", singular),
            search_items: t("Search %s", plural),
            not_found: t("No %s found", plural),
            not_found_in_trash: t("No %s found in Trash", plural),
            parent_item_colon: t("Parent %s:", singular),
        };

        let defaults = ContentTypeDefaults {
            labels,
            menu_icon: self.menu_icon.as_deref(),
            supports: &self.supports,
            taxonomies: &self.taxonomies,
            menu_position: self.menu_position,
            public: self.public,
            show_ui: true,
            show_in_menu: true,
            show_in_rest: self.show_in_rest,
            publicly_queryable: true,
            exclude_from_search: false,
            has_archive: self.has_archive,
            query_var: true,
            can_export: true,
            rewrite: Rewrite::new(self.names.slug()),
            capability_type: [
                self.capability_type.singular.as_str(),
                self.capability_type.plural.as_str(),
            ],
            capabilities: &self.capabilities,
        };

        FinalSettings::merge(&defaults, &self.options)
    }

    /// Schedule registration for the host's init phase.
    pub fn create(&self, init: &mut InitPhase) {
        init.schedule(Registration::ContentType(self.clone()));
    }

    /// Register with the host now, unless the type already exists.
    /// Returns whether a registration happened.
    pub fn register<H: Host + ?Sized>(&self, host: &mut H) -> Result<bool> {
        let db_name = self.names.db_name();
        if host.type_exists(db_name) {
            debug!(db_name = %db_name, "content type already registered, skipping");
            return Ok(false);
        }

        let settings = self.plan(&*host)?;
        host.register_content_type(db_name, &settings.to_value())?;
        info!(db_name = %db_name, slug = %self.names.slug(), "registered content type");
        Ok(true)
    }
}

/// Split a comma-separated list, trimming entries and dropping empty ones.
pub(crate) fn split_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

pub(crate) fn non_empty_list<I, S>(values: I, field: &str) -> Result<Vec<String>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let values: Vec<String> = values
        .into_iter()
        .map(|s| s.as_ref().trim().to_string())
        .collect();
    if values.is_empty() || values.iter().any(String::is_empty) {
        return Err(Error::invalid(format!("{field} need to be defined")));
    }
    Ok(values)
}
