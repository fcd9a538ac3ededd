//! Dockyard - keeps Harbor registries, projects, members and users in sync
//! with Kubernetes custom resources

use clap::{Parser, Subcommand};
use std::time::Duration;

mod commands;
mod error;
mod exit_codes;
mod logging;

use logging::LogFormat;

#[derive(Parser)]
#[command(name = "dockyard")]
#[command(author = "Dockyard Contributors")]
#[command(version)]
#[command(about = "Kubernetes operator for Harbor", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log output format
    #[arg(
        long,
        global = true,
        value_enum,
        default_value_t = LogFormat::Text,
        env = "DOCKYARD_LOG_FORMAT"
    )]
    log_format: LogFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the controllers until SIGTERM or ctrl-c
    Run {
        /// Only watch this namespace (default: all namespaces)
        #[arg(short, long, env = "DOCKYARD_NAMESPACE")]
        namespace: Option<String>,

        /// Timeout for each Harbor API call
        #[arg(
            long,
            env = "DOCKYARD_REQUEST_TIMEOUT",
            default_value = "30s",
            value_parser = humantime::parse_duration
        )]
        request_timeout: Duration,

        /// Delay before retrying a failed reconciliation
        #[arg(
            long,
            env = "DOCKYARD_ERROR_REQUEUE",
            default_value = "60s",
            value_parser = humantime::parse_duration
        )]
        error_requeue: Duration,
    },

    /// Print the CustomResourceDefinitions as YAML
    Crds,
}

#[tokio::main]
async fn main() {
    // Setup miette for nice error display
    miette::set_panic_hook();

    let cli = Cli::parse();
    logging::init(cli.log_format);

    let result = match cli.command {
        Commands::Run {
            namespace,
            request_timeout,
            error_requeue,
        } => match commands::run::engine_config(request_timeout, error_requeue) {
            Ok(config) => commands::run::run(namespace, config).await,
            Err(e) => Err(e),
        },
        Commands::Crds => commands::crds::run(),
    };

    if let Err(err) = result {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}
