use clap::{Parser, Subcommand};
use nutanix::config::ENV_HTTP_LOG;
use nutanix::NutanixProvider;
use serde_json::json;
use std::path::{Path, PathBuf};
use tfplug::types::{has_errors, Diagnostic, Dynamic, DynamicValue};
use tfplug::{Context, Host};
use tracing::info;
use tracing_subscriber::EnvFilter;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Parser)]
#[command(name = "terraform-provider-nutanix", version, about)]
struct Cli {
    /// Log filter used when RUST_LOG is unset
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Log every API request and response, secrets redacted
    #[arg(long, global = true, env = "HTTP_LOG")]
    http_log: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print provider, resource and data source schemas as JSON
    Schema {
        /// Only the resource and/or data source with this type name
        #[arg(long = "type")]
        type_name: Option<String>,
    },
    /// Check a configuration against its schema without contacting Prism Central
    Validate {
        type_name: String,
        config: PathBuf,
        /// Treat the type name as a data source. Resources are assumed otherwise
        #[arg(long)]
        data_source: bool,
    },
    /// Configure the provider from NUTANIX_* variables and read a data source
    Read {
        data_source: String,
        config: PathBuf,
        /// Provider block as JSON. Unset fields fall back to NUTANIX_* variables
        #[arg(long)]
        provider_config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let cli = Cli::parse();

    let filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&cli.log_level))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if cli.http_log {
        std::env::set_var(ENV_HTTP_LOG, "true");
    }

    let ctx = Context::new();
    let host = Host::new(NutanixProvider::new());

    match cli.command {
        Command::Schema { type_name } => {
            let output = match type_name {
                Some(name) => single_schema(&host, &ctx, &name).await?,
                None => all_schemas(&host, &ctx).await?,
            };
            print_json(&output)?;
        }
        Command::Validate {
            type_name,
            config,
            data_source,
        } => {
            let config = load_config(Some(&config))?;
            let diagnostics = if data_source {
                host.validate_data_source_config(&ctx, &type_name, &config)
                    .await
            } else {
                host.validate_resource_config(&ctx, &type_name, &config)
                    .await
            };
            finish(&json!({ "diagnostics": diagnostics }), &diagnostics)?;
            info!(type_name = %type_name, "configuration is valid");
        }
        Command::Read {
            data_source,
            config,
            provider_config,
        } => {
            let provider_config = load_config(provider_config.as_deref())?;
            let diagnostics = host.configure(&ctx, provider_config).await;
            if has_errors(&diagnostics) {
                return finish(&json!({ "diagnostics": diagnostics }), &diagnostics);
            }

            let config = load_config(Some(&config))?;
            let read = host.read_data_source(&ctx, &data_source, config).await;
            finish(
                &json!({
                    "state": read.new_state.map(|s| s.value),
                    "diagnostics": read.diagnostics,
                }),
                &read.diagnostics,
            )?;
        }
    }

    Ok(())
}

async fn all_schemas(
    host: &Host<NutanixProvider>,
    ctx: &Context,
) -> Result<serde_json::Value, BoxError> {
    let mut resources = serde_json::Map::new();
    for name in host.resource_types() {
        let schema = host.resource_schema(ctx, &name).await?;
        resources.insert(name, schema.to_json());
    }
    let mut data_sources = serde_json::Map::new();
    for name in host.data_source_types() {
        let schema = host.data_source_schema(ctx, &name).await?;
        data_sources.insert(name, schema.to_json());
    }
    Ok(json!({
        "provider": host.provider_schema(ctx).await.to_json(),
        "resource_schemas": resources,
        "data_source_schemas": data_sources,
    }))
}

/// Several type names are both a resource and a data source
async fn single_schema(
    host: &Host<NutanixProvider>,
    ctx: &Context,
    name: &str,
) -> Result<serde_json::Value, BoxError> {
    let resource = host.resource_schema(ctx, name).await.ok();
    let data_source = host.data_source_schema(ctx, name).await.ok();
    if resource.is_none() && data_source.is_none() {
        return Err(format!("unknown type {}", name).into());
    }
    Ok(json!({
        "resource_schema": resource.map(|s| s.to_json()),
        "data_source_schema": data_source.map(|s| s.to_json()),
    }))
}

fn load_config(path: Option<&Path>) -> Result<DynamicValue, BoxError> {
    let Some(path) = path else {
        return Ok(DynamicValue::empty_object());
    };
    let raw = std::fs::read_to_string(path)?;
    let value: serde_json::Value = serde_json::from_str(&raw)?;
    if !value.is_object() {
        return Err(format!("{} must hold a JSON object", path.display()).into());
    }
    Ok(DynamicValue::new(Dynamic::from(value)))
}

fn print_json(value: &serde_json::Value) -> Result<(), BoxError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn finish(output: &serde_json::Value, diagnostics: &[Diagnostic]) -> Result<(), BoxError> {
    print_json(output)?;
    if has_errors(diagnostics) {
        let errors = diagnostics.iter().filter(|d| d.is_error()).count();
        return Err(format!("{} error diagnostic(s)", errors).into());
    }
    Ok(())
}
