//! Typewright
//!
//! Fluent definitions for content types, taxonomies, and roles, registered
//! against a CMS host through the [`Host`] trait. Definitions compute their
//! settings in memory and defer every host side effect to the host's init
//! phase ([`InitPhase`]).

pub mod capability;
pub mod cli;
pub mod config;
pub mod content_type;
pub mod error;
pub mod host;
pub mod lifecycle;
pub mod naming;
pub mod role;
pub mod settings;
pub mod taxonomy;

pub use capability::{Action, CapabilitySet, CapabilityType, PermissionMap, PermissionSpec, Scope};
pub use config::Config;
pub use content_type::ContentTypeDefinition;
pub use error::{Error, Result};
pub use host::{Host, Identity, Translate};
pub use lifecycle::{InitPhase, InitReport, Registration};
pub use naming::NamePack;
pub use role::RoleDefinition;
pub use settings::{DefinitionOptions, FinalSettings};
pub use taxonomy::TaxonomyDefinition;

pub mod prelude {
    pub use crate::capability::{
        Action, CapabilitySet, CapabilityType, PermissionMap, PermissionSpec, Scope,
    };
    pub use crate::content_type::ContentTypeDefinition;
    pub use crate::error::{Error, Result};
    pub use crate::host::{Host, Translate};
    pub use crate::lifecycle::InitPhase;
    pub use crate::role::RoleDefinition;
    pub use crate::taxonomy::TaxonomyDefinition;
}
