use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Resource types registered by the provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Apps,
    OidcApps,
    SamlApps,
    AppRules,
    AppRoleAttachments,
    Users,
    UserRoleAttachments,
    UserCustomAttributes,
    UserMappings,
    Roles,
    AuthServers,
    Smarthooks,
    SmarthookEnvironmentVariables,
    Privileges,
    Groups,
    SelfRegistrationProfiles,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 16] = [
        ResourceKind::Apps,
        ResourceKind::OidcApps,
        ResourceKind::SamlApps,
        ResourceKind::AppRules,
        ResourceKind::AppRoleAttachments,
        ResourceKind::Users,
        ResourceKind::UserRoleAttachments,
        ResourceKind::UserCustomAttributes,
        ResourceKind::UserMappings,
        ResourceKind::Roles,
        ResourceKind::AuthServers,
        ResourceKind::Smarthooks,
        ResourceKind::SmarthookEnvironmentVariables,
        ResourceKind::Privileges,
        ResourceKind::Groups,
        ResourceKind::SelfRegistrationProfiles,
    ];

    /// Resource type name as used in declarative configuration
    pub fn type_name(&self) -> &'static str {
        match self {
            ResourceKind::Apps => "onelogin_apps",
            ResourceKind::OidcApps => "onelogin_oidc_apps",
            ResourceKind::SamlApps => "onelogin_saml_apps",
            ResourceKind::AppRules => "onelogin_app_rules",
            ResourceKind::AppRoleAttachments => "onelogin_app_role_attachments",
            ResourceKind::Users => "onelogin_users",
            ResourceKind::UserRoleAttachments => "onelogin_user_role_attachments",
            ResourceKind::UserCustomAttributes => "onelogin_user_custom_attributes",
            ResourceKind::UserMappings => "onelogin_user_mappings",
            ResourceKind::Roles => "onelogin_roles",
            ResourceKind::AuthServers => "onelogin_auth_servers",
            ResourceKind::Smarthooks => "onelogin_smarthooks",
            ResourceKind::SmarthookEnvironmentVariables => {
                "onelogin_smarthook_environment_variables"
            }
            ResourceKind::Privileges => "onelogin_privileges",
            ResourceKind::Groups => "onelogin_groups",
            ResourceKind::SelfRegistrationProfiles => "onelogin_self_registration_profiles",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

impl FromStr for ResourceKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Accept both `onelogin_users` and the short `users` form
        let name = s.strip_prefix("onelogin_").unwrap_or(s);
        ResourceKind::ALL
            .into_iter()
            .find(|kind| kind.type_name().strip_prefix("onelogin_") == Some(name))
            .ok_or_else(|| CoreError::unknown_resource_type(s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_kind_round_trips_through_name() {
        for kind in ResourceKind::ALL {
            assert_eq!(kind.type_name().parse::<ResourceKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_short_names() {
        assert_eq!("users".parse::<ResourceKind>().unwrap(), ResourceKind::Users);
        assert_eq!(
            "app_rules".parse::<ResourceKind>().unwrap(),
            ResourceKind::AppRules
        );
    }

    #[test]
    fn test_unknown_resource_type() {
        let err = "onelogin_widgets".parse::<ResourceKind>().unwrap_err();
        assert_eq!(err.to_string(), "Unknown resource type: onelogin_widgets");
    }
}
