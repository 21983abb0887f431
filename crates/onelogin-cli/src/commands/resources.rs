//! Offline commands: nothing here talks to the API.

use anyhow::Result;
use colored::Colorize;
use onelogin_provider::{Record, ResourceController, ResourceRegistry};
use serde_json::json;

use crate::cli::OutputFormat;
use crate::output::{print_schema, print_value};

pub fn list(registry: &ResourceRegistry, format: OutputFormat) -> Result<()> {
    let names = registry.type_names();
    match format {
        OutputFormat::Json => print_value(&json!(names), format),
        OutputFormat::Table => {
            for name in names {
                println!("{}", name.cyan());
            }
        }
    }
    Ok(())
}

pub fn schema(registry: &ResourceRegistry, resource_type: &str, format: OutputFormat) -> Result<()> {
    let controller = registry.get(resource_type)?;
    print_schema(&controller.schema(), format);
    Ok(())
}

pub fn inflate(
    registry: &ResourceRegistry,
    resource_type: &str,
    config: &Record,
) -> Result<()> {
    let controller = registry.get(resource_type)?;
    let payload = controller.plan(config)?;
    print_value(&payload, OutputFormat::Json);
    Ok(())
}
