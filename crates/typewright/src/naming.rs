//! Name derivation for definitions.
//!
//! Every definition is identified by four related names: a human singular
//! and plural, a URL slug, and a machine (database) name. Callers usually
//! supply only the singular; the rest are derived from it.

use serde::Serialize;

use crate::error::{Error, Result};

/// Naive English plural: appends `s`.
pub fn pluralize(singular: &str) -> String {
    format!("{singular}s")
}

/// Lowercase, spaces replaced by hyphens.
pub fn slugify(name: &str) -> String {
    name.to_lowercase().replace(' ', "-")
}

/// Lowercase, spaces replaced by underscores.
pub fn db_name(name: &str) -> String {
    name.to_lowercase().replace(' ', "_")
}

/// The singular, plural, slug, and machine name of a definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NamePack {
    singular: String,
    plural: String,
    slug: String,
    db_name: String,
}

impl NamePack {
    /// Build a name pack from up to four positional parts.
    ///
    /// `parts[0]` is the singular (falls back to `default_singular` when
    /// `parts` is empty), followed by plural, slug, and db name. Omitted
    /// parts are derived from the singular; supplied ones are kept as is.
    pub fn derive<S: AsRef<str>>(parts: &[S], default_singular: &str) -> Result<Self> {
        if parts.len() > 4 {
            return Err(Error::invalid(format!(
                "expected at most 4 names, got {}",
                parts.len()
            )));
        }

        let part = |index: usize, field: &str| -> Result<Option<String>> {
            match parts.get(index) {
                Some(value) => Ok(Some(non_empty(value.as_ref(), field)?.to_string())),
                None => Ok(None),
            }
        };

        let singular = part(0, "singular name")?.unwrap_or_else(|| default_singular.to_string());
        let plural = part(1, "plural name")?.unwrap_or_else(|| pluralize(&singular));
        let slug = part(2, "slug")?.unwrap_or_else(|| slugify(&singular));
        let db_name = part(3, "database name")?.unwrap_or_else(|| db_name(&singular));

        Ok(Self {
            singular,
            plural,
            slug,
            db_name,
        })
    }

    pub fn singular(&self) -> &str {
        &self.singular
    }

    pub fn plural(&self) -> &str {
        &self.plural
    }

    pub fn slug(&self) -> &str {
        &self.slug
    }

    pub fn db_name(&self) -> &str {
        &self.db_name
    }

    /// Replace the singular name verbatim.
    pub fn set_singular(&mut self, singular: &str) -> Result<()> {
        self.singular = non_empty(singular, "singular name")?.to_string();
        Ok(())
    }

    /// Replace the plural name verbatim.
    pub fn set_plural(&mut self, plural: &str) -> Result<()> {
        self.plural = non_empty(plural, "plural name")?.to_string();
        Ok(())
    }

    /// Replace the slug. The input is re-slugified.
    pub fn set_slug(&mut self, slug: &str) -> Result<()> {
        self.slug = slugify(non_empty(slug, "slug")?);
        Ok(())
    }

    /// Replace the database name. The input is re-derived.
    pub fn set_db_name(&mut self, name: &str) -> Result<()> {
        self.db_name = db_name(non_empty(name, "database name")?);
        Ok(())
    }
}

/// Reject empty and all-whitespace values.
pub(crate) fn non_empty<'a>(value: &'a str, field: &str) -> Result<&'a str> {
    if value.trim().is_empty() {
        return Err(Error::invalid(format!("{field} needs to be defined")));
    }
    Ok(value)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn singular_alone_derives_the_rest() {
        for singular in ["Book", "Custom Post Type", "Case Study", "FAQ"] {
            let names = NamePack::derive(&[singular], "unused").unwrap();
            assert_eq!(names.singular(), singular);
            assert_eq!(names.plural(), format!("{singular}s"));
            assert_eq!(names.slug(), singular.to_lowercase().replace(' ', "-"));
            assert_eq!(names.db_name(), singular.to_lowercase().replace(' ', "_"));
        }
    }

    #[test]
    fn empty_parts_use_default_singular() {
        let names = NamePack::derive::<&str>(&[], "Custom Taxonomy").unwrap();
        assert_eq!(names.singular(), "Custom Taxonomy");
        assert_eq!(names.plural(), "Custom Taxonomys");
        assert_eq!(names.slug(), "custom-taxonomy");
        assert_eq!(names.db_name(), "custom_taxonomy");
    }

    #[test]
    fn explicit_parts_are_kept_verbatim() {
        let names =
            NamePack::derive(&["Person", "People", "Team-Member", "staff"], "unused").unwrap();
        assert_eq!(names.plural(), "People");
        assert_eq!(names.slug(), "Team-Member");
        assert_eq!(names.db_name(), "staff");
    }

    #[test]
    fn empty_part_is_rejected() {
        let err = NamePack::derive(&["Book", ""], "unused").unwrap_err();
        assert!(matches!(err, Error::InvalidConfiguration(_)));
    }

    #[test]
    fn too_many_parts_is_rejected() {
        let err = NamePack::derive(&["a", "b", "c", "d", "e"], "unused").unwrap_err();
        assert!(matches!(err, Error::InvalidConfiguration(_)));
    }

    #[test]
    fn slug_and_db_name_setters_re_derive() {
        let mut names = NamePack::derive(&["Book"], "unused").unwrap();
        names.set_slug("Rare Books").unwrap();
        names.set_db_name("Rare Books").unwrap();
        assert_eq!(names.slug(), "rare-books");
        assert_eq!(names.db_name(), "rare_books");
    }

    #[test]
    fn failed_setter_keeps_previous_value() {
        let mut names = NamePack::derive(&["Book"], "unused").unwrap();
        assert!(names.set_plural("   ").is_err());
        assert!(names.set_slug("").is_err());
        assert_eq!(names.plural(), "Books");
        assert_eq!(names.slug(), "book");
    }
}
