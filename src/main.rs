use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use netgw::api::client::AdminClient;
use netgw::api::GatewayApi;
use netgw::config::Config;
use netgw::resource::gateway::GatewayResource;
use netgw::resource::StackResource;
use netgw::template::Template;
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::Level;
use tracing_subscriber::fmt::writer::MakeWriterExt;

/// Operator harness for network gateway resources
#[derive(Parser, Debug)]
#[command(name = "netgw", version, about, long_about = None)]
struct Args {
    /// Admin API endpoint, e.g. https://netadmin.example:9696
    #[arg(short, long)]
    endpoint: Option<String>,

    /// Bearer token for the admin API
    #[arg(short, long)]
    token: Option<String>,

    /// Log level for debugging
    #[arg(long, value_enum, default_value = "off")]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate a template without calling the service
    Validate {
        /// Template file (YAML or JSON)
        template: PathBuf,
    },
    /// Create every resource in a template, in declaration order
    Apply {
        /// Template file (YAML or JSON)
        template: PathBuf,
    },
    /// Delete template resources in reverse declaration order
    Delete {
        /// Template file (YAML or JSON)
        template: PathBuf,
        /// Identifier recorded by a previous apply, as name=id; repeatable
        #[arg(long = "id", value_name = "NAME=ID")]
        ids: Vec<String>,
    },
    /// Show an attribute of an applied resource
    Show {
        /// Template file (YAML or JSON)
        template: PathBuf,
        /// Logical resource name within the template
        resource: String,
        /// Attribute name from the resource's attributes schema
        attribute: String,
        /// Identifier recorded by a previous apply
        #[arg(long)]
        id: String,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_tracing_level(self) -> Option<Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(Level::ERROR),
            LogLevel::Warn => Some(Level::WARN),
            LogLevel::Info => Some(Level::INFO),
            LogLevel::Debug => Some(Level::DEBUG),
            LogLevel::Trace => Some(Level::TRACE),
        }
    }
}

fn setup_logging(level: LogLevel) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let tracing_level = level.to_tracing_level()?;

    let log_path = get_log_path();

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let file = match std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
    {
        Ok(file) => file,
        Err(err) => {
            eprintln!("Failed to open log file {log_path:?}: {err}");
            return None;
        }
    };

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    tracing_subscriber::fmt()
        .with_max_level(tracing_level)
        .with_writer(non_blocking.with_max_level(tracing_level))
        .with_ansi(false)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("netgw started with log level: {:?}", level);
    tracing::info!("Log file: {:?}", log_path);

    Some(guard)
}

fn get_log_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("netgw").join("netgw.log");
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".netgw").join("netgw.log");
    }
    PathBuf::from("netgw.log")
}

fn load_template(path: &Path) -> Result<Template> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read template {}", path.display()))?;
    Template::parse(&content)
        .with_context(|| format!("Failed to parse template {}", path.display()))
}

/// Fill the configured default tenant into gateway properties that do
/// not declare one.
fn with_default_tenant(resource_type: &str, properties: &Value, config: &Config) -> Value {
    let mut properties = properties.clone();
    if resource_type == GatewayResource::TYPE {
        if let (Some(map), Some(tenant)) = (properties.as_object_mut(), &config.tenant_id) {
            map.entry("tenant_id".to_string())
                .or_insert_with(|| Value::String(tenant.clone()));
        }
    }
    properties
}

fn build_resources(
    template: &Template,
    api: Arc<dyn GatewayApi>,
    config: &Config,
) -> Result<Vec<(String, StackResource)>> {
    let poll = config.poll_policy();
    let mut resources = Vec::new();

    for (name, declared) in &template.resources {
        let properties = with_default_tenant(&declared.resource_type, &declared.properties, config);
        let resource = StackResource::from_type(
            Arc::clone(&api),
            &declared.resource_type,
            name,
            &properties,
            poll,
        )
        .with_context(|| format!("Resource {name:?} is invalid"))?;
        resource
            .validate()
            .with_context(|| format!("Resource {name:?} failed validation"))?;
        resources.push((name.clone(), resource));
    }

    Ok(resources)
}

fn parse_id_pairs(pairs: &[String]) -> Result<HashMap<String, String>> {
    pairs
        .iter()
        .map(|pair| {
            pair.split_once('=')
                .map(|(name, id)| (name.to_string(), id.to_string()))
                .ok_or_else(|| anyhow!("--id expects name=id, got {pair:?}"))
        })
        .collect()
}

async fn run(args: Args) -> Result<()> {
    let config = Config::load();

    if let Command::Validate { template } = &args.command {
        let template = load_template(template)?;
        // Validation needs no live endpoint; a placeholder client keeps
        // construction uniform.
        let api: Arc<dyn GatewayApi> = Arc::new(AdminClient::new("http://localhost:9696", "")?);
        let resources = build_resources(&template, api, &config)?;
        println!("{} resource(s) valid", resources.len());
        return Ok(());
    }

    let endpoint = args
        .endpoint
        .or_else(|| config.effective_endpoint())
        .ok_or_else(|| {
            anyhow!("No endpoint configured. Set NETGW_ENDPOINT, the config file, or --endpoint")
        })?;
    let token = args.token.unwrap_or_else(|| config.effective_token());
    let api: Arc<dyn GatewayApi> = Arc::new(AdminClient::new(&endpoint, &token)?);

    match args.command {
        Command::Validate { .. } => unreachable!("handled above"),
        Command::Apply { template } => {
            let template = load_template(&template)?;
            let resources = build_resources(&template, api, &config)?;

            for (name, mut resource) in resources {
                if let Err(err) = resource.create().await {
                    let state = resource.state();
                    eprintln!(
                        "Failed to create {name}: {err} (state {:?}/{:?})",
                        state.action, state.status
                    );
                    return Err(err.into());
                }
                let id = resource.resource_id().unwrap_or_default();
                println!("{name}={id}");
            }
        }
        Command::Delete { template, ids } => {
            let template = load_template(&template)?;
            let ids = parse_id_pairs(&ids)?;
            let resources = build_resources(&template, api, &config)?;

            for (name, mut resource) in resources.into_iter().rev() {
                let Some(id) = ids.get(&name) else {
                    tracing::warn!(resource = %name, "no identifier supplied, skipping");
                    continue;
                };
                resource.set_resource_id(id)?;
                resource
                    .delete()
                    .await
                    .with_context(|| format!("Failed to delete {name}"))?;
                println!("{name} deleted");
            }
        }
        Command::Show {
            template,
            resource,
            attribute,
            id,
        } => {
            let template = load_template(&template)?;
            let declared = template
                .resource(&resource)
                .ok_or_else(|| anyhow!("No resource {resource:?} in template"))?;

            let properties =
                with_default_tenant(&declared.resource_type, &declared.properties, &config);
            let mut stack_resource = StackResource::from_type(
                api,
                &declared.resource_type,
                &resource,
                &properties,
                config.poll_policy(),
            )?;
            stack_resource.set_resource_id(&id)?;

            let value = stack_resource.attribute(&attribute).await?;
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let _log_guard = setup_logging(args.log_level);

    run(args).await
}
