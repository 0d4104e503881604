//! Role definitions and capability grants.
//!
//! A role's capabilities are never set directly. They are derived from its
//! capability type and permission spec, and re-derived whenever either
//! changes, so the two always agree.

use tracing::{debug, info};

use crate::capability::{self, BASE_CAPABILITY, CapabilitySet, CapabilityType, PermissionSpec};
use crate::error::{Error, Result};
use crate::host::Host;
use crate::lifecycle::{InitPhase, Registration};
use crate::naming::{self, non_empty};

/// Display name used when no names are supplied.
pub const DEFAULT_DISPLAY_NAME: &str = "Custom Role";

/// Roles that receive grants alongside the defined role.
pub const DEFAULT_BOOTSTRAP_ROLES: [&str; 3] = ["administrator", "editor", "author"];

/// A named set of capabilities.
#[derive(Debug, Clone)]
pub struct RoleDefinition {
    display_name: String,
    role_name: String,
    capability_type: CapabilityType,
    permissions: PermissionSpec,
    capabilities: CapabilitySet,
    bootstrap_roles: Vec<String>,
}

impl RoleDefinition {
    /// Create a role from a display name and optional machine name.
    ///
    /// The capability set is derived immediately.
    pub fn new<S: AsRef<str>>(
        names: &[S],
        capability_type: CapabilityType,
        permissions: PermissionSpec,
    ) -> Result<Self> {
        if names.len() > 2 {
            return Err(Error::invalid(format!(
                "expected at most 2 role names, got {}",
                names.len()
            )));
        }

        let display_name = match names.first() {
            Some(name) => non_empty(name.as_ref(), "role display name")?.to_string(),
            None => DEFAULT_DISPLAY_NAME.to_string(),
        };
        let role_name = match names.get(1) {
            Some(name) => non_empty(name.as_ref(), "role name")?.to_string(),
            None => naming::db_name(&display_name),
        };
        let capabilities = capability::derive(&capability_type, &permissions)?;

        Ok(Self {
            display_name,
            role_name,
            capability_type,
            permissions,
            capabilities,
            bootstrap_roles: DEFAULT_BOOTSTRAP_ROLES.map(String::from).into(),
        })
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn set_display_name(&mut self, display_name: &str) -> Result<&mut Self> {
        self.display_name = non_empty(display_name, "role display name")?.to_string();
        Ok(self)
    }

    /// The machine name the host knows the role by.
    pub fn role_name(&self) -> &str {
        &self.role_name
    }

    /// Set the machine name. The input is re-derived (lowercased,
    /// spaces to underscores).
    pub fn set_role_name(&mut self, role_name: &str) -> Result<&mut Self> {
        self.role_name = naming::db_name(non_empty(role_name, "role name")?);
        Ok(self)
    }

    pub fn capability_type(&self) -> &CapabilityType {
        &self.capability_type
    }

    /// Change the capability type and re-derive capabilities.
    pub fn set_capability_type(&mut self, capability_type: CapabilityType) -> Result<&mut Self> {
        self.capabilities = capability::derive(&capability_type, &self.permissions)?;
        self.capability_type = capability_type;
        Ok(self)
    }

    pub fn permissions(&self) -> &PermissionSpec {
        &self.permissions
    }

    /// Change the permission spec and re-derive capabilities.
    pub fn set_permissions(&mut self, permissions: PermissionSpec) -> Result<&mut Self> {
        self.capabilities = capability::derive(&self.capability_type, &permissions)?;
        self.permissions = permissions;
        Ok(self)
    }

    pub fn capabilities(&self) -> &CapabilitySet {
        &self.capabilities
    }

    /// Always fails: use [`set_permissions`](Self::set_permissions).
    pub fn set_capabilities(&mut self, _capabilities: CapabilitySet) -> Result<&mut Self> {
        Err(Error::invalid(
            "role capabilities cannot be set directly; use set_permissions() to generate them",
        ))
    }

    /// Drop every derived capability except `read`.
    pub fn reset_capabilities(&mut self) -> &mut Self {
        self.capabilities.reset();
        self
    }

    pub fn bootstrap_roles(&self) -> &[String] {
        &self.bootstrap_roles
    }

    /// Replace the roles that share grants with this one.
    pub fn set_bootstrap_roles<I, S>(&mut self, roles: I) -> Result<&mut Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let roles = roles
            .into_iter()
            .map(|r| non_empty(r.as_ref(), "bootstrap role").map(str::to_string))
            .collect::<Result<Vec<_>>>()?;
        self.bootstrap_roles = roles;
        Ok(self)
    }

    /// Schedule adding the role for the host's init phase.
    pub fn create(&self, init: &mut InitPhase) {
        init.schedule(Registration::AddRole(self.clone()));
    }

    /// Schedule removing the role for the host's init phase.
    pub fn destroy(&self, init: &mut InitPhase) {
        init.schedule(Registration::RemoveRole(self.clone()));
    }

    /// Add the role with its capability set unless it already exists.
    pub fn add_role<H: Host + ?Sized>(&self, host: &mut H) -> Result<bool> {
        if host.role_exists(&self.role_name) {
            debug!(role = %self.role_name, "role already exists, skipping");
            return Ok(false);
        }

        host.add_role(
            &self.role_name,
            &self.display_name,
            self.capabilities.as_slice(),
        )?;
        info!(
            role = %self.role_name,
            capabilities = self.capabilities.len(),
            "added role"
        );
        Ok(true)
    }

    /// Remove the role if it exists.
    pub fn remove_role<H: Host + ?Sized>(&self, host: &mut H) -> Result<bool> {
        if !host.role_exists(&self.role_name) {
            debug!(role = %self.role_name, "role does not exist, nothing to remove");
            return Ok(false);
        }

        host.remove_role(&self.role_name)?;
        info!(role = %self.role_name, "removed role");
        Ok(true)
    }

    /// Add every derived capability to this role, and unless
    /// `only_this_role`, to the bootstrap roles as well.
    pub fn grant<H: Host + ?Sized>(&self, host: &mut H, only_this_role: bool) -> Result<()> {
        let targets = self.targets(&*host, only_this_role)?;
        for role in &targets {
            for capability in self.capabilities.iter() {
                host.add_capability(role, capability)?;
            }
        }

        info!(
            role = %self.role_name,
            targets = ?targets,
            capabilities = self.capabilities.len(),
            "granted capabilities"
        );
        Ok(())
    }

    /// Remove every derived capability from the same targets as
    /// [`grant`](Self::grant). `read` is never removed.
    pub fn revoke<H: Host + ?Sized>(&self, host: &mut H, only_this_role: bool) -> Result<()> {
        let targets = self.targets(&*host, only_this_role)?;
        let revoked: Vec<&str> = self
            .capabilities
            .iter()
            .filter(|c| *c != BASE_CAPABILITY)
            .collect();

        for role in &targets {
            for capability in &revoked {
                host.remove_capability(role, capability)?;
            }
        }

        info!(
            role = %self.role_name,
            targets = ?targets,
            capabilities = revoked.len(),
            "revoked capabilities"
        );
        Ok(())
    }

    /// Resolve grant targets before any mutation so a missing role fails the
    /// whole operation.
    fn targets<H: Host + ?Sized>(&self, host: &H, only_this_role: bool) -> Result<Vec<String>> {
        let mut targets = Vec::new();

        if host.role_exists(&self.role_name) {
            targets.push(self.role_name.clone());
        } else if only_this_role {
            return Err(Error::role_not_found(&self.role_name));
        }

        if !only_this_role {
            for role in &self.bootstrap_roles {
                if !host.role_exists(role) {
                    return Err(Error::role_not_found(role));
                }
                if !targets.contains(role) {
                    targets.push(role.clone());
                }
            }
        }

        Ok(targets)
    }
}
