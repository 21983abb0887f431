//! Controller lifecycles against the in-memory backend.

use std::sync::Arc;

use assert_json_diff::{assert_json_eq, assert_json_include};
use onelogin_client::{ApiError, Collection, MemoryApi, MemoryOp};
use onelogin_core::ErrorCategory;
use onelogin_provider::{Provider, ProviderError, Record, ResourceController, ResourceData};
use serde_json::{Value, json};

fn record(value: Value) -> Record {
    Record::from_value(value).unwrap()
}

fn provider() -> (Arc<MemoryApi>, Provider) {
    let api = Arc::new(MemoryApi::new());
    let provider = Provider::with_api(api.clone());
    (api, provider)
}

#[tokio::test]
async fn test_role_create_read_delete() {
    let (api, provider) = provider();
    let roles = provider.resource("onelogin_roles").unwrap();
    let mut data = ResourceData::new(record(json!({"name": "admins", "users": [3, 4]})));

    roles.create(api.as_ref(), &mut data).await.unwrap();
    assert_eq!(data.id(), Some("1000"));
    assert_json_eq!(
        data.state().to_value(),
        json!({"name": "admins", "apps": [], "users": [3, 4], "admins": []})
    );

    roles.delete(api.as_ref(), &mut data).await.unwrap();
    assert_eq!(data.id(), None);
    assert_eq!(api.count(&Collection::Roles), 0);
}

#[tokio::test]
async fn test_read_of_missing_object_clears_id() {
    let (api, provider) = provider();
    let users = provider.resource("users").unwrap();
    let mut data = ResourceData::new(record(json!({"username": "u", "email": "u@x.io"})))
        .with_id("404")
        .with_state(record(json!({"username": "u"})));

    users.read(api.as_ref(), &mut data).await.unwrap();
    assert_eq!(data.id(), None);
    assert!(data.state().is_empty());
}

#[tokio::test]
async fn test_read_not_found_error_clears_id() {
    let (api, provider) = provider();
    api.fail_next(
        MemoryOp::Get,
        &Collection::Roles,
        ApiError::status(404, "role does not exist"),
    );
    let roles = provider.resource("roles").unwrap();
    let mut data = ResourceData::default().with_id("12");
    roles.read(api.as_ref(), &mut data).await.unwrap();
    assert_eq!(data.id(), None);
}

#[tokio::test]
async fn test_partial_create_keeps_id() {
    let (api, provider) = provider();
    api.insert(
        &Collection::Users,
        "55",
        json!({"username": "timmy", "email": "timmy@example.com"}),
    );
    api.fail_next(
        MemoryOp::Create,
        &Collection::Users,
        ApiError::partial_success(json!({"id": 55}), "role assignment failed"),
    );
    let users = provider.resource("users").unwrap();
    let mut data = ResourceData::new(record(
        json!({"username": "timmy", "email": "timmy@example.com"}),
    ));

    let err = users.create(api.as_ref(), &mut data).await.unwrap_err();
    assert!(err.is_partial_success());
    assert_eq!(data.id(), Some("55"));
    assert_eq!(
        data.state().string("username").unwrap().as_deref(),
        Some("timmy")
    );
}

#[tokio::test]
async fn test_update_without_id_in_response_clears_id() {
    let (api, provider) = provider();
    let roles = provider.resource("roles").unwrap();
    let mut data = ResourceData::new(record(json!({"name": "renamed"}))).with_id("999");
    roles.update(api.as_ref(), &mut data).await.unwrap();
    assert_eq!(data.id(), None);
}

#[tokio::test]
async fn test_failed_delete_leaves_state() {
    let (api, provider) = provider();
    let roles = provider.resource("roles").unwrap();
    let mut data = ResourceData::new(record(json!({"name": "admins"})));
    roles.create(api.as_ref(), &mut data).await.unwrap();
    let state = data.state().clone();

    api.fail_next(
        MemoryOp::Delete,
        &Collection::Roles,
        ApiError::status(500, "boom"),
    );
    let err = roles.delete(api.as_ref(), &mut data).await.unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Delete);
    assert_eq!(
        err.to_string(),
        "[DELETE] Error deleting onelogin_roles (ID: 1000): status: 500, body: boom"
    );
    assert_eq!(data.id(), Some("1000"));
    assert_eq!(data.state(), &state);
}

#[tokio::test]
async fn test_delete_without_id() {
    let (api, provider) = provider();
    let roles = provider.resource("roles").unwrap();
    let err = roles
        .delete(api.as_ref(), &mut ResourceData::default())
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "ID is empty");
}

#[tokio::test]
async fn test_app_rule_round_trip() {
    let (api, provider) = provider();
    let rules = provider.resource("onelogin_app_rules").unwrap();
    let config = json!({
        "app_id": "123",
        "name": "eng-admin",
        "match": "all",
        "enabled": true,
        "conditions": [{"source": "last_login", "operator": ">", "value": "90"}],
        "actions": [{"action": "set_status", "value": ["1"]}]
    });
    let mut data = ResourceData::new(record(config.clone()));

    rules.create(api.as_ref(), &mut data).await.unwrap();
    let id = data.id().unwrap().to_string();
    assert_json_include!(actual: data.state().to_value(), expected: config);
    assert!(
        api.stored(&Collection::AppRules { app_id: "123".to_string() }, &id)
            .is_some()
    );

    let imported = rules
        .import(api.as_ref(), &format!("123/{id}"))
        .await
        .unwrap();
    assert_eq!(imported.id(), Some(id.as_str()));
    assert_eq!(
        imported.state().string("app_id").unwrap().as_deref(),
        Some("123")
    );
    assert_eq!(
        imported.state().string("name").unwrap().as_deref(),
        Some("eng-admin")
    );
}

#[tokio::test]
async fn test_invalid_match_is_rejected_before_any_call() {
    let (api, provider) = provider();
    let rules = provider.resource("app_rules").unwrap();
    let mut data = ResourceData::new(record(json!({"app_id": "1", "name": "r", "match": "some"})));
    let err = rules.create(api.as_ref(), &mut data).await.unwrap_err();
    assert!(err.is_config_error());
    assert!(api.calls().is_empty());
}

#[tokio::test]
async fn test_group_create_is_unsupported() {
    let (api, provider) = provider();
    let groups = provider.resource("groups").unwrap();
    let mut data = ResourceData::new(record(json!({"name": "g"})));
    let err = groups.create(api.as_ref(), &mut data).await.unwrap_err();
    assert!(matches!(err, ProviderError::Unsupported(_)));
    assert_eq!(
        err.to_string(),
        "Creating groups is not yet supported by the OneLogin API"
    );
}

#[tokio::test]
async fn test_self_registration_fields_follow_configuration() {
    let (api, provider) = provider();
    let profiles = provider.resource("self_registration_profiles").unwrap();
    let mut data = ResourceData::new(record(json!({
        "name": "signup",
        "url": "signup",
        "fields": [{"custom_attribute_id": 5}]
    })));

    profiles.create(api.as_ref(), &mut data).await.unwrap();
    let profile_id = data.id().unwrap().to_string();
    let fields = data.state().blocks("fields").unwrap();
    assert_eq!(fields.len(), 1);
    assert_eq!(fields[0].int32("custom_attribute_id").unwrap(), Some(5));
    assert_eq!(data.state().bool("enabled").unwrap(), Some(true));

    data.set_config(record(json!({
        "name": "signup",
        "url": "signup",
        "fields": [{"custom_attribute_id": 6}, {"custom_attribute_id": 7}]
    })));
    profiles.update(api.as_ref(), &mut data).await.unwrap();
    let ids: Vec<i32> = data
        .state()
        .blocks("fields")
        .unwrap()
        .iter()
        .filter_map(|field| field.int32("custom_attribute_id").unwrap())
        .collect();
    assert_eq!(ids, vec![6, 7]);
    assert_eq!(
        api.count(&Collection::SelfRegistrationProfileFields { profile_id }),
        2
    );
}

#[tokio::test]
async fn test_failed_field_sync_is_partial_success() {
    let (api, provider) = provider();
    api.fail_next(
        MemoryOp::Create,
        &Collection::SelfRegistrationProfileFields {
            profile_id: "1000".to_string(),
        },
        ApiError::status(422, "unknown custom attribute"),
    );
    let profiles = provider.resource("self_registration_profiles").unwrap();
    let mut data = ResourceData::new(record(json!({
        "name": "signup",
        "url": "signup",
        "fields": [{"custom_attribute_id": 5}]
    })));

    let err = profiles.create(api.as_ref(), &mut data).await.unwrap_err();
    assert!(err.is_partial_success());
    assert_eq!(data.id(), Some("1000"));
}

#[tokio::test]
async fn test_user_update_keeps_remote_custom_attributes() {
    let (api, provider) = provider();
    let users = provider.resource("users").unwrap();
    let mut data = ResourceData::new(record(json!({
        "username": "timmy",
        "email": "timmy@example.com",
        "custom_attributes": {"team": "blue"}
    })));
    users.create(api.as_ref(), &mut data).await.unwrap();
    let id = data.id().unwrap().to_string();

    let attributes = provider.resource("user_custom_attributes").unwrap();
    let mut badge = ResourceData::new(record(json!({
        "name": "Badge",
        "shortname": "badge",
        "user_id": id.parse::<i32>().unwrap(),
        "value": "77"
    })));
    attributes.create(api.as_ref(), &mut badge).await.unwrap();

    data.set_config(record(json!({
        "username": "timmy",
        "email": "timmy@example.com",
        "custom_attributes": {"team": "red"}
    })));
    users.update(api.as_ref(), &mut data).await.unwrap();
    assert_eq!(
        api.stored(&Collection::Users, &id).unwrap()["custom_attributes"],
        json!({"team": "red", "badge": "77"})
    );
}

#[tokio::test]
async fn test_attachments() {
    let (api, provider) = provider();
    api.insert(&Collection::Apps, "10", json!({"name": "wiki", "role_ids": []}));
    api.insert(&Collection::Roles, "7", json!({"name": "admins", "users": []}));

    let app_roles = provider.resource("app_role_attachments").unwrap();
    let mut attachment = ResourceData::new(record(json!({"app_id": 10, "role_id": 7})));
    app_roles.create(api.as_ref(), &mut attachment).await.unwrap();
    assert_eq!(attachment.id(), Some("710"));

    let role_users = provider.resource("user_role_attachments").unwrap();
    let mut members = ResourceData::new(record(json!({"role_id": 7, "users": [1, 2]})));
    role_users.create(api.as_ref(), &mut members).await.unwrap();
    assert_eq!(members.id(), Some("7"));
    assert_eq!(members.state().int_list("users").unwrap(), Some(vec![1, 2]));

    api.insert(&Collection::Apps, "10", json!({"name": "wiki", "role_ids": []}));
    app_roles.read(api.as_ref(), &mut attachment).await.unwrap();
    assert_eq!(attachment.id(), None);
}

/// Creates the resource, reads it back, and checks every configured value
/// survives both trips into state.
async fn round_trip(
    api: &MemoryApi,
    provider: &Provider,
    type_name: &str,
    config: Value,
) -> ResourceData {
    let resource = provider.resource(type_name).unwrap();
    let mut data = ResourceData::new(record(config.clone()));
    resource.create(api, &mut data).await.unwrap();
    assert!(data.id().is_some(), "{type_name} create left no id");
    assert_json_include!(actual: data.state().to_value(), expected: config.clone());

    resource.read(api, &mut data).await.unwrap();
    assert_json_include!(actual: data.state().to_value(), expected: config);
    data
}

#[tokio::test]
async fn test_app_round_trip() {
    let (api, provider) = provider();
    round_trip(
        &api,
        &provider,
        "apps",
        json!({
            "name": "wiki",
            "connector_id": 108419,
            "description": "team wiki",
            "notes": "owned by docs",
            "visible": false,
            "allow_assumed_signin": true,
            "brand_id": 12,
            "role_ids": [3, 4],
            "provisioning": [{"enabled": true}],
            "parameters": [{
                "param_key_name": "email",
                "label": "Email",
                "user_attribute_mappings": "email",
                "default_values": "none",
                "include_in_saml_assertion": true,
                "skip_if_blank": false
            }]
        }),
    )
    .await;
}

#[tokio::test]
async fn test_oidc_app_round_trip() {
    let (api, provider) = provider();
    round_trip(
        &api,
        &provider,
        "oidc_apps",
        json!({
            "name": "portal",
            "connector_id": 108419,
            "configuration": {
                "redirect_uri": "https://portal.example.com/cb",
                "login_url": "https://portal.example.com/login",
                "oidc_application_type": "1",
                "token_endpoint_auth_method": "2",
                "access_token_expiration_minutes": "60",
                "refresh_token_expiration_minutes": "30"
            }
        }),
    )
    .await;
}

#[tokio::test]
async fn test_oidc_zero_values_are_elided_from_state() {
    let (api, provider) = provider();
    let apps = provider.resource("oidc_apps").unwrap();
    let mut data = ResourceData::new(record(json!({
        "name": "portal",
        "connector_id": 108419,
        "configuration": {
            "redirect_uri": "https://portal.example.com/cb",
            "oidc_application_type": "0",
            "refresh_token_expiration_minutes": "0"
        }
    })));
    apps.create(api.as_ref(), &mut data).await.unwrap();
    assert_json_eq!(
        data.state().to_value()["configuration"],
        json!({"redirect_uri": "https://portal.example.com/cb"})
    );
}

#[tokio::test]
async fn test_saml_app_round_trip() {
    let (api, provider) = provider();
    round_trip(
        &api,
        &provider,
        "saml_apps",
        json!({
            "name": "payroll",
            "connector_id": 50534,
            "configuration": {
                "signature_algorithm": "SHA-256",
                "certificate_id": "7"
            }
        }),
    )
    .await;
}

#[tokio::test]
async fn test_user_round_trip() {
    let (api, provider) = provider();
    round_trip(
        &api,
        &provider,
        "users",
        json!({
            "username": "timmy",
            "email": "timmy@example.com",
            "firstname": "Timmy",
            "lastname": "Turner",
            "distinguished_name": "CN=timmy,DC=example,DC=com",
            "samaccountname": "tturner",
            "userprincipalname": "timmy@example.com",
            "member_of": "staff",
            "phone": "555-0100",
            "title": "Engineer",
            "company": "Example",
            "department": "Platform",
            "comment": "test account",
            "state": 1,
            "status": 1,
            "group_id": 9,
            "directory_id": 4,
            "trusted_idp_id": 2,
            "manager_ad_id": 77,
            "manager_user_id": 31,
            "external_id": 1234,
            "custom_attributes": {"badge": "77"},
            "role_ids": [5, 6]
        }),
    )
    .await;
}

#[tokio::test]
async fn test_role_round_trip() {
    let (api, provider) = provider();
    round_trip(
        &api,
        &provider,
        "roles",
        json!({"name": "admins", "apps": [10], "users": [3, 4], "admins": [3]}),
    )
    .await;
}

#[tokio::test]
async fn test_smarthook_round_trip() {
    let (api, provider) = provider();
    round_trip(
        &api,
        &provider,
        "smarthooks",
        json!({
            "type": "pre-authentication",
            "function": "ZnVuY3Rpb24gbXlGdW5jKCkgewogIHJldHVybiB0cnVlOwp9",
            "disabled": true,
            "timeout": 2,
            "retries": 1,
            "env_vars": ["API_KEY"],
            "runtime": "nodejs18.x",
            "context_version": "1.1.0",
            "options": [{
                "risk_enabled": true,
                "mfa_device_info_enabled": true,
                "location_enabled": false
            }],
            "packages": {"mysql": "^2.18.1"},
            "conditions": [{"source": "roles", "operator": "~", "value": "123"}]
        }),
    )
    .await;
}

#[tokio::test]
async fn test_smarthook_env_var_round_trip() {
    let (api, provider) = provider();
    round_trip(
        &api,
        &provider,
        "smarthook_environment_variables",
        json!({"name": "API_KEY", "value": "s3cr3t"}),
    )
    .await;
}

#[tokio::test]
async fn test_privilege_round_trip() {
    let (api, provider) = provider();
    round_trip(
        &api,
        &provider,
        "privileges",
        json!({
            "name": "user admin",
            "description": "manages users",
            "user_ids": [3],
            "role_ids": [5],
            "privilege": [{
                "version": "2018-05-18",
                "statement": [
                    {"effect": "Allow", "action": ["users:List", "users:Get"], "scope": ["*"]},
                    {"effect": "Allow", "action": ["apps:List"], "scope": ["apps/10"]}
                ]
            }]
        }),
    )
    .await;
}

#[tokio::test]
async fn test_self_registration_profile_round_trip() {
    let (api, provider) = provider();
    round_trip(
        &api,
        &provider,
        "self_registration_profiles",
        json!({
            "name": "signup",
            "url": "signup",
            "enabled": true,
            "moderated": true,
            "default_role_id": 3,
            "default_group_id": 4,
            "helptext": "Register with your work email",
            "thankyou_message": "Thanks",
            "domain_blacklist": "spam.example",
            "domain_whitelist": "example.com",
            "domain_list_strategy": 1,
            "email_verification_type": "Email OTP",
            "fields": [{"custom_attribute_id": 5}]
        }),
    )
    .await;
}

#[tokio::test]
async fn test_group_import_round_trip() {
    let (api, provider) = provider();
    api.insert(&Collection::Groups, "5", json!({"name": "Ops", "reference": "ext-5"}));
    let groups = provider.resource("groups").unwrap();

    let data = groups.import(api.as_ref(), "5").await.unwrap();
    assert_eq!(data.id(), Some("5"));
    assert_json_eq!(
        data.state().to_value(),
        json!({"name": "Ops", "reference": "ext-5"})
    );
}

#[test]
fn test_configured_ids_are_sent_only_when_numeric() {
    let (_, provider) = provider();
    let configs = [
        ("users", json!({"username": "u", "email": "u@example.com"})),
        ("roles", json!({"name": "admins"})),
        ("user_mappings", json!({"name": "m", "match": "all", "position": 1})),
    ];
    for (type_name, config) in configs {
        let resource = provider.resource(type_name).unwrap();
        for (id, expected) in [("42", Some(json!(42))), ("abc", None)] {
            let mut config = config.clone();
            config["id"] = json!(id);
            let body = resource.plan(&record(config)).unwrap();
            assert_eq!(body.get("id").cloned(), expected, "{type_name} with id {id}");
        }
    }
}
