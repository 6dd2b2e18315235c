//! # dronesec
//!
//! Push `*.secret` files into a Drone repository's secret store.
//!
//! ## Usage
//!
//! ```bash
//! # Create or overwrite every ./name.secret as secret "name"
//! DRONE_SYSTEM_HOST=drone.example.com DRONE_REPO_OWNER=acme \
//!   DRONE_REPO_NAME=api DRONE_TOKEN=... dronesec
//!
//! # Remove secrets by name
//! dronesec delete registry_password api_key
//! ```

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{debug, error, info};

use dronesec::config::SyncConfig;
use dronesec::logging::{init_tracing, Logger, TracingLogger};
use dronesec::secret_files::find_secret_files;
use dronesec::SecretReconciler;

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("BUILD_GIT_HASH"),
    ", built ",
    env!("BUILD_DATETIME"),
    ")"
);

const USAGE: &str = "\
Secrets must be files named \"secret_name.secret\": the file name without the
extension is the secret name and the content is the value. Place as many as
you like in the secrets directory. Configuration is read from flags or these
environment variables:
  DRONE_SYSTEM_PROTO   scheme of the Drone server (default https)
  DRONE_SYSTEM_HOST    host of the Drone server
  DRONE_REPO_OWNER     repository owner
  DRONE_REPO_NAME      repository name
  DRONE_TOKEN          API token
  DRONE_CA_CERTS       CA file or directory replacing the built-in roots
  INSECURE             ignore certificates
  DEBUG                debug log
  QUIET                warnings and errors only
  SECRETS_DIR          directory holding the secret files (default .)
";

/// Sync secret files into a Drone repository
#[derive(Parser)]
#[command(name = "dronesec", version, long_version = LONG_VERSION, after_help = USAGE)]
struct Cli {
    #[command(flatten)]
    config: SyncConfig,

    /// Directory holding the *.secret files
    #[arg(long, env = "SECRETS_DIR", default_value = ".", global = true)]
    dir: PathBuf,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or overwrite every secret file (default)
    Sync,
    /// Delete secrets by name; missing secrets are not an error
    Delete {
        #[arg(value_name = "NAME", required = true)]
        names: Vec<String>,
    },
}

/// Failure stage, mapped to the process exit code
enum Failure {
    Discovery(anyhow::Error),
    Setup(anyhow::Error),
    Operation(anyhow::Error),
}

impl Failure {
    fn exit_code(&self) -> u8 {
        match self {
            Failure::Discovery(_) => 1,
            Failure::Setup(_) => 2,
            Failure::Operation(_) => 3,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.config.verbosity());

    // Install ring before any TLS work; a provider installed earlier is fine too
    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        debug!("rustls crypto provider already installed");
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(failure) => {
            match &failure {
                Failure::Discovery(e) | Failure::Operation(e) => error!("{e:#}"),
                Failure::Setup(e) => {
                    error!("{e:#}");
                    info!("{USAGE}");
                }
            }
            ExitCode::from(failure.exit_code())
        }
    }
}

async fn run(cli: Cli) -> Result<(), Failure> {
    let command = cli.command.unwrap_or(Commands::Sync);

    // Discover first so a missing file fails before any network call
    let secrets = match &command {
        Commands::Sync => Some(
            find_secret_files(&cli.dir)
                .context("Secret discovery failed")
                .map_err(Failure::Discovery)?,
        ),
        Commands::Delete { .. } => None,
    };

    let reconciler = connect(&cli.config).await.map_err(Failure::Setup)?;

    match command {
        Commands::Sync => {
            for secret in secrets.unwrap_or_default() {
                reconciler
                    .create(&secret.name, &secret.data)
                    .await
                    .context("Sync aborted")
                    .map_err(Failure::Operation)?;
            }
        }
        Commands::Delete { names } => {
            for name in names {
                reconciler
                    .delete(&name)
                    .await
                    .context("Delete aborted")
                    .map_err(Failure::Operation)?;
            }
        }
    }
    Ok(())
}

async fn connect(config: &SyncConfig) -> Result<SecretReconciler> {
    let logger: Arc<dyn Logger> = Arc::new(TracingLogger);

    info!(
        "Connecting to {} for {}/{}",
        config.host_url(),
        config.owner,
        config.repo
    );
    SecretReconciler::new(
        &config.host_url(),
        &config.owner,
        &config.repo,
        &config.token,
        config.certs_location(),
        config.builder_flags(),
        Some(logger),
    )
    .await
    .context("Failed to set up the Drone client")
}
