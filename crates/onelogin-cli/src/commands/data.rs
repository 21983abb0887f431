use anyhow::Result;
use onelogin_provider::{DataSource, Provider, Record, ResourceData};

use crate::cli::OutputFormat;
use crate::output::print_resource;

/// Reads a data source; a query without matches is an error here.
pub async fn read(
    provider: &Provider,
    source_type: &str,
    config: Record,
    format: OutputFormat,
) -> Result<()> {
    let source = provider.data_source(source_type)?;
    let mut data = ResourceData::new(config);
    source.read(provider.api().as_ref(), &mut data).await?;
    if data.id().is_none() {
        anyhow::bail!("{} query matched nothing", source.type_name());
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

    #[tokio::test]
    async fn test_read_user_data_source() {
        let api = Arc::new(MemoryApi::new());
        api.insert(&Collection::Users, "8", json!({"username": "ann", "email": "a@x.io"}));
        let provider = Provider::with_api(api);

        let config = Record::new().with("username", "ann");
        read(&provider, "user", config, OutputFormat::Json).await.unwrap();

        let config = Record::new().with("username", "zed");
        let err = read(&provider, "onelogin_user", config, OutputFormat::Json)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "onelogin_user query matched nothing");
    }
}
