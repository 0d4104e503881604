//! The host's init phase.
//!
//! Definitions never touch the host when they are created. They schedule a
//! [`Registration`] here instead, and the host drains the queue exactly once
//! from its own initialization hook by calling [`InitPhase::run`].

use tracing::info;

use crate::content_type::ContentTypeDefinition;
use crate::error::Result;
use crate::host::Host;
use crate::role::RoleDefinition;
use crate::taxonomy::TaxonomyDefinition;

/// A deferred side effect against the host.
#[derive(Debug, Clone)]
pub enum Registration {
    ContentType(ContentTypeDefinition),
    Taxonomy(TaxonomyDefinition),
    AddRole(RoleDefinition),
    RemoveRole(RoleDefinition),
}

impl Registration {
    /// Machine name of the definition this registration affects.
    pub fn db_name(&self) -> &str {
        match self {
            Self::ContentType(def) => def.db_name(),
            Self::Taxonomy(def) => def.db_name(),
            Self::AddRole(role) | Self::RemoveRole(role) => role.role_name(),
        }
    }

    /// Short label for logs and reports.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ContentType(_) => "content_type",
            Self::Taxonomy(_) => "taxonomy",
            Self::AddRole(_) => "add_role",
            Self::RemoveRole(_) => "remove_role",
        }
    }

    /// Apply against the host. Returns `false` when the host already had
    /// the desired state and nothing was changed.
    pub fn apply<H: Host + ?Sized>(&self, host: &mut H) -> Result<bool> {
        match self {
            Self::ContentType(def) => def.register(host),
            Self::Taxonomy(def) => def.register(host),
            Self::AddRole(role) => role.add_role(host),
            Self::RemoveRole(role) => role.remove_role(host),
        }
    }
}

/// Outcome of one applied registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Applied {
    pub kind: &'static str,
    pub db_name: String,
    pub changed: bool,
}

/// Summary of an init run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InitReport {
    pub applied: Vec<Applied>,
}

impl InitReport {
    /// Number of registrations that changed host state.
    pub fn changed(&self) -> usize {
        self.applied.iter().filter(|a| a.changed).count()
    }

    /// Number of registrations skipped because the host already had them.
    pub fn skipped(&self) -> usize {
        self.applied.len() - self.changed()
    }
}

/// Queue of registrations waiting for the host's init phase.
#[derive(Debug, Default)]
pub struct InitPhase {
    pending: Vec<Registration>,
}

impl InitPhase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a registration. Registrations run in scheduling order.
    pub fn schedule(&mut self, registration: Registration) {
        self.pending.push(registration);
    }

    pub fn pending(&self) -> &[Registration] {
        &self.pending
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Apply every queued registration. Consumes the queue so it can only
    /// run once; stops at the first failing registration.
    pub fn run<H: Host + ?Sized>(self, host: &mut H) -> Result<InitReport> {
        info!(pending = self.pending.len(), "running init phase");

        let mut report = InitReport::default();
        for registration in &self.pending {
            let changed = registration.apply(&mut *host)?;
            report.applied.push(Applied {
                kind: registration.kind(),
                db_name: registration.db_name().to_string(),
                changed,
            });
        }

        info!(
            changed = report.changed(),
            skipped = report.skipped(),
            "init phase complete"
        );
        Ok(report)
    }
}
