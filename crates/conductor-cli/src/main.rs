//! Conductor CLI — command-line interface for agent discovery and workflow
//! orchestration.
//!
//! Reuses the same core domain logic (conductor-core) and server bootstrap
//! (conductor-server) that the HTTP coordinator runs.

use clap::{Parser, Subcommand};

use conductor_cli::commands;

/// Conductor — multi-agent discovery and workflow orchestration
#[derive(Parser)]
#[command(
    name = "conductor",
    version,
    about = "Conductor — multi-agent discovery and workflow orchestration"
)]
pub struct Cli {
    /// Path to a YAML configuration file
    #[arg(long, env = "CONDUCTOR_CONFIG")]
    config: Option<String>,

    /// Directory of extra workflow templates (overrides the config file)
    #[arg(long, env = "CONDUCTOR_TEMPLATES_DIR")]
    templates_dir: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the coordinator HTTP server
    Server {
        /// Host to bind to
        #[arg(long, env = "CONDUCTOR_HOST", default_value = "127.0.0.1")]
        host: String,
        /// Port to listen on
        #[arg(long, env = "CONDUCTOR_PORT", default_value_t = 3010)]
        port: u16,
        /// Skip the initial discovery pass
        #[arg(long)]
        no_discover: bool,
        /// Do not run the periodic health monitor
        #[arg(long)]
        no_health: bool,
    },

    /// Probe the configured agents once and print the registry
    Discover {
        /// Also run one health check cycle
        #[arg(long)]
        health: bool,
    },

    /// Run, list and validate workflow templates
    Workflow {
        #[command(subcommand)]
        action: WorkflowAction,
    },

    /// Send a raw JSON-RPC request to an in-process coordinator
    Rpc {
        /// JSON-RPC method name (e.g. "orchestration.workflows.list")
        #[arg(long)]
        method: String,
        /// JSON-RPC params as a JSON string
        #[arg(long, default_value = "{}")]
        params: String,
    },
}

#[derive(Subcommand)]
enum WorkflowAction {
    /// Discover agents, run a template in-process and print the result
    Run {
        /// Template name
        template: String,
        /// Workflow input as a JSON object
        #[arg(long, default_value = "{}")]
        input: String,
        /// Use only agents already known instead of probing first
        #[arg(long)]
        no_discover: bool,
    },
    /// List the available templates
    List,
    /// Validate a template YAML file without executing it
    Validate {
        /// Path to the template YAML file
        file: String,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| conductor_server::DEFAULT_LOG_FILTER.into()),
        )
        .init();

    let mut config = commands::load_config(cli.config.as_deref());
    if cli.templates_dir.is_some() {
        config.templates_dir = cli.templates_dir;
    }

    let result = match cli.command {
        Commands::Server {
            host,
            port,
            no_discover,
            no_health,
        } => commands::server::run(host, port, config, !no_discover, !no_health).await,

        Commands::Discover { health } => {
            let state = commands::init_state(config);
            commands::discover::run(&state, health).await
        }

        Commands::Workflow { action } => match action {
            WorkflowAction::Run {
                template,
                input,
                no_discover,
            } => {
                let state = commands::init_state(config);
                commands::workflow::run(&state, &template, &input, !no_discover).await
            }
            WorkflowAction::List => {
                let state = commands::init_state(config);
                commands::workflow::list(&state).await
            }
            WorkflowAction::Validate { file } => commands::workflow::validate(&file).await,
        },

        Commands::Rpc { method, params } => {
            let state = commands::init_state(config);
            commands::rpc::call(&state, &method, &params).await
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
