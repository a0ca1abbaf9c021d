//! Roles and their login profiles

use phf::phf_map;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::engine::{Locator, LocatorChain};
use crate::{Config, Error, Result};

/// ERP user role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Depot,
    Conductor,
    Driver,
    Passenger,
}

/// Accepted spellings of each role, lowercase
static ROLE_ALIASES: phf::Map<&'static str, Role> = phf_map! {
    "admin" => Role::Admin,
    "administrator" => Role::Admin,
    "depot" => Role::Depot,
    "depot manager" => Role::Depot,
    "depot-manager" => Role::Depot,
    "depot_manager" => Role::Depot,
    "conductor" => Role::Conductor,
    "driver" => Role::Driver,
    "passenger" => Role::Passenger,
    "pax" => Role::Passenger,
};

impl Role {
    pub const ALL: [Role; 5] = [
        Role::Admin,
        Role::Depot,
        Role::Conductor,
        Role::Driver,
        Role::Passenger,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Depot => "depot",
            Role::Conductor => "conductor",
            Role::Driver => "driver",
            Role::Passenger => "passenger",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        ROLE_ALIASES
            .get(s.trim().to_lowercase().as_str())
            .copied()
            .ok_or_else(|| Error::configuration(format!("Unknown role: {}", s)))
    }
}

/// Everything needed to log in as a role and recognise its landing page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleProfile {
    pub role: Role,
    pub email: String,
    pub password: String,
    /// URL fragment of the role's dashboard, e.g. `/admin`
    pub expected_fragment: String,
    /// Role-specific dashboard markers
    pub dashboard: LocatorChain,
}

impl RoleProfile {
    fn builtin(role: Role) -> Self {
        let (email, password, fragment) = match role {
            Role::Admin => ("admin@yatrik.com", "admin123", "/admin"),
            Role::Depot => ("depot-plk@yatrik.com", "Akhil@123", "/depot"),
            Role::Conductor => ("joel@gmail.com", "Yatrik123", "/conductor"),
            Role::Driver => ("rejith@gmail.com", "Akhil@123", "/driver"),
            Role::Passenger => ("lijithmk2026@mca.ajce.in", "Akhil@123", "/pax"),
        };

        Self {
            role,
            email: email.to_string(),
            password: password.to_string(),
            expected_fragment: fragment.to_string(),
            dashboard: dashboard_markers(role),
        }
    }
}

/// `[data-testid='<role>-dashboard']`, then `.<role>-dashboard`
pub fn dashboard_markers(role: Role) -> LocatorChain {
    let name = role.as_str();
    LocatorChain::new(Locator::css(format!("[data-testid='{}-dashboard']", name)))
        .or(Locator::css(format!(".{}-dashboard", name)))
        .labeled(format!("{} dashboard", name))
}

/// Layout markers shared by every dashboard
pub fn generic_dashboard_markers() -> LocatorChain {
    LocatorChain::new(Locator::css("[data-testid='dashboard-sidebar']"))
        .or(Locator::css(".dashboard-header"))
        .or(Locator::css("header"))
        .or(Locator::css(".navbar"))
        .labeled("dashboard layout")
}

/// Role profiles, built in and overridable from [`Config::roles`]
#[derive(Debug, Clone)]
pub struct RoleCatalog {
    profiles: BTreeMap<Role, RoleProfile>,
    generic_dashboard: LocatorChain,
}

impl Default for RoleCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl RoleCatalog {
    /// Credentials seeded in the development database
    pub fn builtin() -> Self {
        Self {
            profiles: Role::ALL
                .iter()
                .map(|role| (*role, RoleProfile::builtin(*role)))
                .collect(),
            generic_dashboard: generic_dashboard_markers(),
        }
    }

    /// Built-in profiles with the config's `[roles.<name>]` tables applied
    pub fn from_config(config: &Config) -> Result<Self> {
        let mut catalog = Self::builtin();

        for (name, overrides) in &config.roles {
            let role: Role = name.parse()?;
            let profile = catalog.profile_mut(role);

            if let Some(email) = &overrides.email {
                profile.email = email.clone();
            }
            if let Some(password) = &overrides.password {
                profile.password = password.clone();
            }
            if let Some(fragment) = &overrides.expected_fragment {
                if !fragment.starts_with('/') {
                    return Err(Error::configuration(format!(
                        "expected_fragment for {} must start with '/'",
                        role
                    )));
                }
                profile.expected_fragment = fragment.clone();
            }
        }

        Ok(catalog)
    }

    pub fn profile(&self, role: Role) -> &RoleProfile {
        // Every role is inserted at construction and never removed
        &self.profiles[&role]
    }

    fn profile_mut(&mut self, role: Role) -> &mut RoleProfile {
        self.profiles
            .entry(role)
            .or_insert_with(|| RoleProfile::builtin(role))
    }

    pub fn generic_dashboard(&self) -> &LocatorChain {
        &self.generic_dashboard
    }

    pub fn profiles(&self) -> impl Iterator<Item = &RoleProfile> {
        self.profiles.values()
    }
}
