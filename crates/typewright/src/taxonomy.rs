//! Taxonomy definitions.

use serde::Serialize;
use tracing::{debug, info};

use crate::content_type::{non_empty_list, split_list};
use crate::error::Result;
use crate::host::{Host, Identity, Translate};
use crate::lifecycle::{InitPhase, Registration};
use crate::naming::NamePack;
use crate::settings::{DefinitionOptions, FinalSettings, Rewrite, label};

/// Singular name used when no names are supplied.
pub const DEFAULT_SINGULAR: &str = "Custom Taxonomy";

/// Content types a taxonomy attaches to when none are given.
pub const DEFAULT_POST_TYPES: [&str; 1] = ["post"];

/// A classification scheme attached to one or more content types.
#[derive(Debug, Clone)]
pub struct TaxonomyDefinition {
    names: NamePack,
    post_types: Vec<String>,
    options: DefinitionOptions,
}

#[derive(Serialize)]
struct TaxonomyLabels {
    name: String,
    singular_name: String,
    search_items: String,
    popular_items: String,
    all_items: String,
    parent_item: String,
    parent_item_colon: String,
    edit_item: String,
    update_item: String,
    add_new_item: String,
    new_item_name: String,
    separate_items_with_commas: String,
    add_or_remove_items: String,
    choose_from_most_used: String,
    menu_name: String,
}

#[derive(Serialize)]
struct TaxonomyDefaults {
    labels: TaxonomyLabels,
    public: bool,
    show_in_nav_menus: bool,
    show_ui: bool,
    show_tagcloud: bool,
    show_admin_column: bool,
    hierarchical: bool,
    rewrite: Rewrite,
    query_var: bool,
}

impl TaxonomyDefinition {
    /// Create a taxonomy attached to `post_types`.
    pub fn new<S, P, I>(names: &[S], post_types: I) -> Result<Self>
    where
        S: AsRef<str>,
        I: IntoIterator<Item = P>,
        P: AsRef<str>,
    {
        Self::with_options(names, post_types, DefinitionOptions::new())
    }

    /// Create a taxonomy attached to [`DEFAULT_POST_TYPES`].
    pub fn for_posts<S: AsRef<str>>(names: &[S]) -> Result<Self> {
        Self::new(names, DEFAULT_POST_TYPES)
    }

    pub fn with_options<S, P, I>(
        names: &[S],
        post_types: I,
        options: DefinitionOptions,
    ) -> Result<Self>
    where
        S: AsRef<str>,
        I: IntoIterator<Item = P>,
        P: AsRef<str>,
    {
        Ok(Self {
            names: NamePack::derive(names, DEFAULT_SINGULAR)?,
            post_types: non_empty_list(post_types, "taxonomy post type(s)")?,
            options,
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

    pub fn post_types(&self) -> &[String] {
        &self.post_types
    }

    pub fn set_post_types<I, P>(&mut self, post_types: I) -> Result<&mut Self>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<str>,
    {
        self.post_types = non_empty_list(post_types, "taxonomy post type(s)")?;
        Ok(self)
    }

    /// Set attached content types from a comma-separated list.
    pub fn set_post_types_str(&mut self, post_types: &str) -> Result<&mut Self> {
        self.set_post_types(split_list(post_types))
    }

    pub fn options(&self) -> &DefinitionOptions {
        &self.options
    }

    pub fn set_options(&mut self, options: DefinitionOptions) -> &mut Self {
        self.options = options;
        self
    }

    pub fn finalize(&self) -> Result<FinalSettings> {
        self.plan(&Identity)
    }

    pub fn plan<T: Translate + ?Sized>(&self, translator: &T) -> Result<FinalSettings> {
        let singular = self.names.singular();
        let plural = self.names.plural();
        let domain = self.names.slug();
        let t = |pattern: &str, name: &str| label(translator, pattern, name, domain);

        let labels = TaxonomyLabels {
            name: t("%s", plural),
            singular_name: t("%s", singular),
            search_items: t("Search %s", plural),
            popular_items: t("Popular %s", plural),
            all_items: t("All %s", plural),
            parent_item: t("Parent %s", singular),
            parent_item_colon: t("Parent %s:", singular),
            edit_item: t("Edit %s", singular),
            update_item: t("Update %s", singular),
            add_new_item: t("Add New %s", singular),
            new_item_name: t("New %s", singular),
            separate_items_with_commas: t("Separate %s with commas", plural),
            add_or_remove_items: t("Add or remove %s", plural),
            choose_from_most_used: t("Choose from most used %s", plural),
            menu_name: t("%s", plural),
        };

        let defaults = TaxonomyDefaults {
            labels,
            public: false,
            show_in_nav_menus: false,
            show_ui: true,
            show_tagcloud: false,
            show_admin_column: true,
            hierarchical: true,
            rewrite: Rewrite::new(self.names.slug()),
            query_var: true,
        };

        FinalSettings::merge(&defaults, &self.options)
    }

    /// Schedule registration for the host's init phase.
    pub fn create(&self, init: &mut InitPhase) {
        init.schedule(Registration::Taxonomy(self.clone()));
    }

    /// Register with the host now, unless the taxonomy already exists.
    pub fn register<H: Host + ?Sized>(&self, host: &mut H) -> Result<bool> {
        let db_name = self.names.db_name();
        if host.taxonomy_exists(db_name) {
            debug!(db_name = %db_name, "taxonomy already registered, skipping");
            return Ok(false);
        }

        let settings = self.plan(&*host)?;
        host.register_taxonomy(db_name, &self.post_types, &settings.to_value())?;
        info!(
            db_name = %db_name,
            post_types = ?self.post_types,
            "registered taxonomy"
        );
        Ok(true)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::error::Error;
    use serde_json::json;

    #[test]
    fn for_posts_attaches_to_post() {
        let tag = TaxonomyDefinition::for_posts(&["Topic"]).unwrap();
        assert_eq!(tag.post_types(), ["post"]);
        assert_eq!(tag.db_name(), "topic");
    }

    #[test]
    fn genre_labels_and_defaults() {
        let settings = TaxonomyDefinition::new(&["Genre"], ["book"])
            .unwrap()
            .finalize()
            .unwrap();

        assert_eq!(settings.label("name"), Some("Genres"));
        assert_eq!(settings.label("popular_items"), Some("Popular Genres"));
        assert_eq!(
            settings.label("separate_items_with_commas"),
            Some("Separate Genres with commas")
        );
        assert_eq!(settings.label("new_item_name"), Some("New Genre"));
        assert_eq!(settings.as_map()["labels"].as_object().unwrap().len(), 15);
        assert_eq!(settings.get("public"), Some(&json!(false)));
        assert_eq!(settings.get("hierarchical"), Some(&json!(true)));
        assert_eq!(settings.rewrite_slug(), Some("genre"));
    }

    #[test]
    fn overlay_merges_into_rewrite() {
        let mut options = DefinitionOptions::new();
        options.insert("hierarchical".into(), json!(false));
        options.insert("rewrite".into(), json!({"with_front": true}));

        let settings = TaxonomyDefinition::with_options(&["Topic"], ["post"], options)
            .unwrap()
            .finalize()
            .unwrap();

        assert_eq!(settings.get("hierarchical"), Some(&json!(false)));
        assert_eq!(
            settings.pointer("/rewrite"),
            Some(&json!({"slug": "topic", "with_front": true, "feeds": false, "pages": true}))
        );
    }

    #[test]
    fn post_types_must_be_non_empty() {
        let err = TaxonomyDefinition::new(&["Genre"], Vec::<String>::new()).unwrap_err();
        assert!(matches!(err, Error::InvalidConfiguration(_)));

        let mut tax = TaxonomyDefinition::new(&["Genre"], ["book"]).unwrap();
        assert!(tax.set_post_types([""]).is_err());
        assert_eq!(tax.post_types(), ["book"]);

        tax.set_post_types_str("book, movie").unwrap();
        assert_eq!(tax.post_types(), ["book", "movie"]);
    }

    #[test]
    fn name_setters() {
        let mut tax = TaxonomyDefinition::new::<&str, _, _>(&[], ["post"]).unwrap();
        assert_eq!(tax.db_name(), "custom_taxonomy");

        tax.set_singular("Reading Level")
            .unwrap()
            .set_db_name("Reading Level")
            .unwrap();
        assert_eq!(tax.singular(), "Reading Level");
        assert_eq!(tax.db_name(), "reading_level");
        assert_eq!(tax.slug(), "custom-taxonomy");
    }
}
