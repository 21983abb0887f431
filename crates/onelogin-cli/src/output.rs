use colored::Colorize;
use onelogin_provider::{ResourceData, Schema};
use serde_json::{Value, json};
use tabled::builder::Builder;
use tabled::settings::Style;

use crate::cli::OutputFormat;

pub fn print_value(value: &Value, format: OutputFormat) {
    match format {
        OutputFormat::Json => println!("{}", pretty(value)),
        OutputFormat::Table => print_as_table(value),
    }
}

pub fn print_success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

pub fn print_error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

/// ID and state of a resource instance
pub fn resource_value(data: &ResourceData) -> Value {
    json!({
        "id": data.id(),
        "state": data.state().to_value(),
    })
}

pub fn print_resource(data: &ResourceData, format: OutputFormat) {
    match format {
        OutputFormat::Json => println!("{}", pretty(&resource_value(data))),
        OutputFormat::Table => {
            println!("{} {}", "ID:".cyan(), data.id().unwrap_or("(none)").cyan());
            print_as_table(&data.state().to_value());
        }
    }
}

pub fn schema_value(schema: &Schema) -> Value {
    Value::Array(
        schema
            .iter()
            .map(|attr| {
                json!({
                    "name": attr.name,
                    "type": attr.kind.name(),
                    "mode": attr.mode.name(),
                    "allowed": attr.allowed,
                    "sensitive": attr.sensitive,
                    "force_new": attr.force_new,
                })
            })
            .collect(),
    )
}

pub fn print_schema(schema: &Schema, format: OutputFormat) {
    if format == OutputFormat::Json {
        println!("{}", pretty(&schema_value(schema)));
        return;
    }
    let mut builder = Builder::default();
    builder.push_record(["Attribute", "Type", "Mode", "Allowed", "Flags"]);
    for attr in schema.iter() {
        let allowed = attr.allowed.map(|a| a.join(", ")).unwrap_or_default();
        let mut flags = Vec::new();
        if attr.sensitive {
            flags.push("sensitive");
        }
        if attr.force_new {
            flags.push("force new");
        }
        if attr.deprecated.is_some() {
            flags.push("deprecated");
        }
        builder.push_record([
            attr.name.to_string(),
            attr.kind.name(),
            attr.mode.name().to_string(),
            allowed,
            flags.join(", "),
        ]);
    }
    println!("{}", builder.build().with(Style::rounded()).to_string());
}

fn cell(value: &Value) -> String {
    match value {
        Value::Null => "-".to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn print_as_table(value: &Value) {
    match value {
        Value::Object(map) if map.is_empty() => println!("(empty)"),
        Value::Object(map) => {
            let mut builder = Builder::default();
            builder.push_record(["Key", "Value"]);
            for (key, value) in map {
                builder.push_record([key.clone(), cell(value)]);
            }
            println!("{}", builder.build().with(Style::rounded()).to_string());
        }
        other => println!("{}", pretty(other)),
    }
}
