mod cli;
mod commands;
mod config;
mod observability;
mod output;

use anyhow::Result;
use clap::Parser;
use onelogin_config::EnvSource;
use onelogin_provider::{Provider, ResourceRegistry};

use cli::{Cli, Commands};
use output::print_error;

#[tokio::main]
async fn main() {
    // A missing .env is fine
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    observability::init_tracing(cli.verbose);

    if let Err(e) = run(cli).await {
        print_error(&format!("{e:#}"));
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let profile = config::load_profile(&config::profiles_path()?, &cli.profile)?;
    let format = cli
        .format
        .or_else(|| profile.output_format())
        .unwrap_or_default();
    tracing::debug!(profile = %cli.profile, format = ?format, "resolved CLI options");

    // Commands that never reach the API
    let registry = ResourceRegistry::new();
    match &cli.command {
        Commands::Resources => return commands::resources::list(&registry, format),
        Commands::Schema(args) => {
            return commands::resources::schema(&registry, &args.resource_type, format);
        }
        Commands::Inflate(args) => {
            let config = commands::read_config(args.file.as_deref())?;
            return commands::resources::inflate(&registry, &args.resource_type, &config);
        }
        _ => {}
    }

    let provider_config = config::resolve_provider_config(&cli, profile, EnvSource::from_process())?;
    let provider = Provider::configure(&provider_config)?;

    match &cli.command {
        Commands::Create(args) => {
            let config = commands::read_config(args.file.as_deref())?;
            commands::crud::create(&provider, &args.resource_type, config, format).await?;
        }
        Commands::Read(args) => {
            let config = commands::read_optional_config(args.file.as_deref())?;
            commands::crud::read(&provider, &args.resource_type, &args.id, config, format).await?;
        }
        Commands::Update(args) => {
            let config = commands::read_config(args.file.as_deref())?;
            commands::crud::update(&provider, &args.resource_type, &args.id, config, format)
                .await?;
        }
        Commands::Delete(args) => {
            let config = commands::read_optional_config(args.file.as_deref())?;
            commands::crud::delete(&provider, &args.resource_type, &args.id, config).await?;
        }
        Commands::Import(args) => {
            commands::crud::import(&provider, &args.resource_type, &args.import_id, format)
                .await?;
        }
        Commands::Data(args) => {
            let config = commands::read_optional_config(args.file.as_deref())?;
            commands::data::read(&provider, &args.source_type, config, format).await?;
        }
        Commands::Resources | Commands::Schema(_) | Commands::Inflate(_) => {}
    }

    Ok(())
}
