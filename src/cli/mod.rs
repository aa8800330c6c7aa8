//! # Command Line Interface
//!
//! `edgepass sign` issues access cookies for a configured resource,
//! `edgepass secret` resolves a secret through the cache-aside path and
//! `edgepass verify` checks a credential against a public key offline.

pub mod output;
pub mod secret;
pub mod sign;
pub mod verify;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::debug;

use crate::config::{AppConfig, ObservabilityConfig};
use crate::errors::Error;
use crate::observability::{init_logging, log_config_info};
use output::OutputFormat;

/// Environment variable naming a configuration file.
pub const CONFIG_ENV: &str = "EDGEPASS_CONFIG";

#[derive(Parser)]
#[command(name = "edgepass")]
#[command(about = "Signed CDN access cookies and cached vault secrets")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to a TOML configuration file (default: EDGEPASS_CONFIG, then EDGEPASS_* variables)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    pub output: OutputFormat,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Issue signed cookies for a configured resource
    Sign {
        /// Resource name from the configuration
        #[arg(default_value = crate::config::DEFAULT_RESOURCE)]
        resource: String,

        /// Policy lifetime in seconds (default: the resource's default_ttl_secs)
        #[arg(long)]
        ttl: Option<u64>,
    },

    /// Resolve a secret and print its field names
    Secret {
        /// Secret name (default: secrets.secret_name)
        name: Option<String>,
    },

    /// Verify a signed credential against a public key
    Verify {
        /// PEM public key file
        #[arg(long)]
        public_key: PathBuf,

        /// CloudFront-Policy cookie value
        #[arg(long)]
        policy: String,

        /// CloudFront-Signature cookie value
        #[arg(long)]
        signature: String,

        /// CloudFront-Key-Pair-Id cookie value
        #[arg(long)]
        key_pair_id: Option<String>,
    },
}

/// Run CLI commands
pub async fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Sign { resource, ttl } => {
            let config = load_config(cli.config.as_deref())?;
            initialise_logging(&config.observability, cli.verbose);
            log_config_info(&config);
            sign::handle_sign_command(&config, &resource, ttl, cli.output).await
        }
        Commands::Secret { name } => {
            let config = load_config(cli.config.as_deref())?;
            initialise_logging(&config.observability, cli.verbose);
            log_config_info(&config);
            let secrets = config.require_secrets()?;
            secret::handle_secret_command(secrets, name, cli.output).await
        }
        Commands::Verify { public_key, policy, signature, key_pair_id } => {
            initialise_logging(&ObservabilityConfig::default(), cli.verbose);
            verify::handle_verify_command(&public_key, policy, signature, key_pair_id, cli.output)
                .await
        }
    }
}

/// Resolve configuration: `--config`, then `EDGEPASS_CONFIG`, then `EDGEPASS_*` variables.
pub fn load_config(path: Option<&std::path::Path>) -> anyhow::Result<AppConfig> {
    let path = path.map(PathBuf::from).or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from));

    match path {
        Some(path) => AppConfig::load(&path)
            .with_context(|| format!("Failed to load configuration from {}", path.display())),
        None => AppConfig::from_env().context("Failed to load configuration from environment"),
    }
}

/// Process exit code for a failed command: the crate error's code, else 1.
pub fn exit_code(error: &anyhow::Error) -> u8 {
    error.downcast_ref::<Error>().map(Error::exit_code).unwrap_or(1)
}

fn initialise_logging(config: &ObservabilityConfig, verbose: bool) {
    let mut config = config.clone();
    if verbose {
        config.log_level = "debug".to_string();
    }

    match init_logging(&config) {
        Ok(true) => debug!(log_level = %config.log_level, "Logging initialised"),
        Ok(false) => {}
        Err(e) => eprintln!("Warning: {:#}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_sign() {
        let cli = Cli::try_parse_from(["edgepass", "sign", "media", "--ttl", "600"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Sign { ref resource, ttl: Some(600) } if resource == "media"
        ));

        let cli = Cli::try_parse_from(["edgepass", "sign", "--output", "json"]).unwrap();
        assert_eq!(cli.output, OutputFormat::Json);
        assert!(matches!(
            cli.command,
            Commands::Sign { ref resource, ttl: None } if resource == "default"
        ));
    }

    #[test]
    fn test_parse_verify_requires_fields() {
        assert!(Cli::try_parse_from(["edgepass", "verify", "--policy", "p"]).is_err());

        let cli = Cli::try_parse_from([
            "edgepass",
            "verify",
            "--public-key",
            "/keys/pub.pem",
            "--policy",
            "p",
            "--signature",
            "s",
        ])
        .unwrap();
        assert!(matches!(cli.command, Commands::Verify { key_pair_id: None, .. }));
    }

    #[test]
    fn test_load_config_from_path() {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(
            file.path(),
            r#"
            [resources.media]
            distribution_url = "https://cdn.example.com"
            private_key_path = "/keys/media.pem"
            key_pair_id = "KMEDIA"
            cookie_domain = "cdn.example.com"
            "#,
        )
        .unwrap();

        let config = load_config(Some(file.path())).unwrap();
        assert!(config.resource("media").is_ok());

        let err = load_config(Some(std::path::Path::new("/nonexistent.toml"))).unwrap_err();
        assert!(err.to_string().contains("/nonexistent.toml"));
        assert_eq!(exit_code(&err), 74);
    }

    #[test]
    fn test_exit_code_sees_through_context() {
        let err = anyhow::Error::from(Error::from(crate::secrets::SecretsError::vault(
            "prod/db",
            "permission denied",
        )))
        .context("Failed to resolve secret 'prod/db'");
        assert_eq!(exit_code(&err), 69);

        let err = anyhow::anyhow!("plain failure");
        assert_eq!(exit_code(&err), 1);
    }
}
