use std::fmt;

/// OneLogin REST collections the provider talks to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Collection {
    Apps,
    AppRules { app_id: String },
    Users,
    UserCustomAttributes,
    UserMappings,
    Roles,
    RoleUsers { role_id: String },
    AuthServers,
    SmartHooks,
    SmartHookEnvVars,
    Privileges,
    Groups,
    SelfRegistrationProfiles,
    SelfRegistrationProfileFields { profile_id: String },
}

impl Collection {
    /// Path relative to the API base URL, without leading slash
    pub fn path(&self) -> String {
        match self {
            Collection::Apps => "api/2/apps".to_string(),
            Collection::AppRules { app_id } => format!("api/2/apps/{app_id}/rules"),
            Collection::Users => "api/2/users".to_string(),
            Collection::UserCustomAttributes => "api/2/users/custom_attributes".to_string(),
            Collection::UserMappings => "api/2/mappings".to_string(),
            Collection::Roles => "api/2/roles".to_string(),
            Collection::RoleUsers { role_id } => format!("api/2/roles/{role_id}/users"),
            Collection::AuthServers => "api/2/api_authorizations".to_string(),
            Collection::SmartHooks => "api/2/hooks".to_string(),
            Collection::SmartHookEnvVars => "api/2/hooks/envs".to_string(),
            Collection::Privileges => "api/1/privileges".to_string(),
            Collection::Groups => "api/1/groups".to_string(),
            Collection::SelfRegistrationProfiles => {
                "api/2/self_registration_profiles".to_string()
            }
            Collection::SelfRegistrationProfileFields { profile_id } => {
                format!("api/2/self_registration_profiles/{profile_id}/fields")
            }
        }
    }

    /// Collections whose identifiers are opaque strings rather than integers
    pub fn has_string_ids(&self) -> bool {
        matches!(
            self,
            Collection::SmartHooks | Collection::SmartHookEnvVars | Collection::Privileges
        )
    }

    /// Legacy v1 endpoints wrap payloads in `{"status": .., "data": [..]}`
    pub fn is_v1(&self) -> bool {
        self.path().starts_with("api/1/")
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}
