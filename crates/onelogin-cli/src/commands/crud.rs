use anyhow::Result;
use colored::Colorize;
use onelogin_provider::{Provider, Record, ResourceController, ResourceData};

use crate::cli::OutputFormat;
use crate::output::{print_resource, print_success};

pub async fn create(
    provider: &Provider,
    resource_type: &str,
    config: Record,
    format: OutputFormat,
) -> Result<()> {
    let controller = provider.resource(resource_type)?;
    let mut data = ResourceData::new(config);
    let result = controller.create(provider.api().as_ref(), &mut data).await;
    // A partial success still leaves an ID worth showing.
    if data.id().is_some() {
        print_resource(&data, format);
    }
    result?;
    print_success(&format!(
        "Created {} {}",
        controller.kind().type_name().cyan(),
        data.id().unwrap_or("?").cyan()
    ));
    Ok(())
}

pub async fn read(
    provider: &Provider,
    resource_type: &str,
    id: &str,
    config: Record,
    format: OutputFormat,
) -> Result<()> {
    let controller = provider.resource(resource_type)?;
    let mut data = ResourceData::new(config).with_id(id);
    controller.read(provider.api().as_ref(), &mut data).await?;
    if data.id().is_none() {
        anyhow::bail!("{} {id} no longer exists", controller.kind().type_name());
    }
    print_resource(&data, format);
    Ok(())
}

pub async fn update(
    provider: &Provider,
    resource_type: &str,
    id: &str,
    config: Record,
    format: OutputFormat,
) -> Result<()> {
    let controller = provider.resource(resource_type)?;
    let api = provider.api().as_ref();
    let mut data = ResourceData::new(config).with_id(id);
    // Seed state so controllers that diff against it see the current object.
    controller.read(api, &mut data).await?;
    if data.id().is_none() {
        anyhow::bail!("{} {id} no longer exists", controller.kind().type_name());
    }
    controller.update(api, &mut data).await?;
    match data.id() {
        Some(new_id) => {
            print_resource(&data, format);
            print_success(&format!(
                "Updated {} {}",
                controller.kind().type_name().cyan(),
                new_id.cyan()
            ));
        }
        None => print_success(&format!(
            "{} {id} was removed outside of configuration",
            controller.kind().type_name()
        )),
    }
    Ok(())
}

pub async fn delete(
    provider: &Provider,
    resource_type: &str,
    id: &str,
    config: Record,
) -> Result<()> {
    let controller = provider.resource(resource_type)?;
    let api = provider.api().as_ref();
    let mut data = ResourceData::new(config).with_id(id);
    controller.read(api, &mut data).await?;
    if data.id().is_none() {
        print_success(&format!(
            "{} {id} is already gone",
            controller.kind().type_name()
        ));
        return Ok(());
    }
    controller.delete(api, &mut data).await?;
    print_success(&format!(
        "Deleted {} {}",
        controller.kind().type_name().cyan(),
        id.cyan()
    ));
    Ok(())
}

pub async fn import(
    provider: &Provider,
    resource_type: &str,
    import_id: &str,
    format: OutputFormat,
) -> Result<()> {
    let controller = provider.resource(resource_type)?;
    let data = controller
        .import(provider.api().as_ref(), import_id)
        .await?;
    if data.id().is_none() {
        anyhow::bail!("{} {import_id} does not exist", controller.kind().type_name());
    }
    print_resource(&data, format);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use onelogin_client::{Collection, MemoryApi};
    use serde_json::json;
    use std::sync::Arc;

    fn provider() -> (Arc<MemoryApi>, Provider) {
        let api = Arc::new(MemoryApi::new());
        (api.clone(), Provider::with_api(api))
    }

    #[tokio::test]
    async fn test_create_then_delete_role() {
        let (api, provider) = provider();
        let config = Record::new().with("name", "admins");
        create(&provider, "roles", config, OutputFormat::Json).await.unwrap();
        assert_eq!(api.count(&Collection::Roles), 1);

        delete(&provider, "roles", "1000", Record::new()).await.unwrap();
        assert_eq!(api.count(&Collection::Roles), 0);
    }

    #[tokio::test]
    async fn test_read_missing_resource_fails() {
        let (_api, provider) = provider();
        let err = read(&provider, "roles", "5", Record::new(), OutputFormat::Json)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "onelogin_roles 5 no longer exists");
    }

    #[tokio::test]
    async fn test_update_with_state_from_read() {
        let (api, provider) = provider();
        api.insert(&Collection::Roles, "7", json!({"name": "admins", "users": [1]}));
        let config = Record::new().with("role_id", 7).with("users", json!([2]));
        update(
            &provider,
            "user_role_attachments",
            "7",
            config,
            OutputFormat::Json,
        )
        .await
        .unwrap();
        assert_eq!(api.stored(&Collection::Roles, "7").unwrap()["users"], json!([2]));
    }

    #[tokio::test]
    async fn test_unknown_type() {
        let (_api, provider) = provider();
        let err = import(&provider, "widgets", "1", OutputFormat::Json)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Unknown resource type: widgets");
    }
}
