//! Resource types of the provider.
//!
//! Single-collection resources are [`ResourceMapping`](crate::controller::ResourceMapping)s
//! driven by the generic [`Controller`]; attachments and user custom
//! attributes implement [`ResourceController`](crate::controller::ResourceController)
//! themselves.

use std::sync::Arc;

use onelogin_core::ResourceKind;

use crate::controller::{Controller, DynController};

pub mod app;
pub mod app_role_attachment;
pub mod app_rule;
pub mod auth_server;
pub mod group;
pub mod privilege;
pub mod role;
pub mod rules;
pub mod self_registration_profile;
pub mod smarthook;
pub mod smarthook_env_var;
pub mod user;
pub mod user_custom_attribute;
pub mod user_mapping;
pub mod user_role_attachment;

pub use app::{AppFlavor, Apps};
pub use app_role_attachment::AppRoleAttachments;
pub use app_rule::AppRules;
pub use auth_server::AuthServers;
pub use group::Groups;
pub use privilege::Privileges;
pub use role::Roles;
pub use self_registration_profile::SelfRegistrationProfiles;
pub use smarthook::SmartHooks;
pub use smarthook_env_var::SmartHookEnvVars;
pub use user::Users;
pub use user_custom_attribute::UserCustomAttributes;
pub use user_mapping::UserMappings;
pub use user_role_attachment::UserRoleAttachments;

/// Controller for a resource kind
pub fn controller(kind: ResourceKind) -> DynController {
    match kind {
        ResourceKind::Apps => Arc::new(Controller::new(Apps::new(AppFlavor::Generic))),
        ResourceKind::OidcApps => Arc::new(Controller::new(Apps::new(AppFlavor::Oidc))),
        ResourceKind::SamlApps => Arc::new(Controller::new(Apps::new(AppFlavor::Saml))),
        ResourceKind::AppRules => Arc::new(Controller::new(AppRules)),
        ResourceKind::AppRoleAttachments => Arc::new(AppRoleAttachments::new()),
        ResourceKind::Users => Arc::new(Controller::new(Users)),
        ResourceKind::UserRoleAttachments => Arc::new(UserRoleAttachments::new()),
        ResourceKind::UserCustomAttributes => Arc::new(UserCustomAttributes::new()),
        ResourceKind::UserMappings => Arc::new(Controller::new(UserMappings)),
        ResourceKind::Roles => Arc::new(Controller::new(Roles)),
        ResourceKind::AuthServers => Arc::new(Controller::new(AuthServers)),
        ResourceKind::Smarthooks => Arc::new(Controller::new(SmartHooks)),
        ResourceKind::SmarthookEnvironmentVariables => Arc::new(Controller::new(SmartHookEnvVars)),
        ResourceKind::Privileges => Arc::new(Controller::new(Privileges)),
        ResourceKind::Groups => Arc::new(Controller::new(Groups)),
        ResourceKind::SelfRegistrationProfiles => {
            Arc::new(Controller::new(SelfRegistrationProfiles))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::ResourceController;

    #[test]
    fn test_every_kind_has_a_controller() {
        for kind in ResourceKind::ALL {
            let controller = controller(kind);
            assert_eq!(controller.kind(), kind);
            assert!(!controller.schema().is_empty(), "{kind} has an empty schema");
        }
    }
}
