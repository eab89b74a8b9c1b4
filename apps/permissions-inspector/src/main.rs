#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Prints the effective permission matrix of every model declared with
//! `#[derive(Model)]` and linked into this binary.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use fastforge_permissions::{ModelDescriptor, PermissionsConfig, Role, init_global};
use tracing::debug;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

mod report;

use report::ModelReport;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "permissions-inspector", version, about, long_about = None)]
struct Cli {
    /// YAML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Validate declarations strictly, whatever the configuration says
    #[arg(long)]
    strict: bool,

    /// Only report this model
    #[arg(short, long, value_name = "NAME")]
    model: Option<String>,

    /// Only report this role
    #[arg(short, long, value_name = "ROLE")]
    role: Option<Role>,

    /// Output format
    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,
}

fn init_logging() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn load_config(path: Option<&Path>, strict: bool) -> Result<PermissionsConfig> {
    if let Some(path) = path
        && !path.is_file()
    {
        bail!("configuration file not found: {}", path.display());
    }
    let mut config = PermissionsConfig::load(path).context("failed to load configuration")?;
    if strict {
        config.strict = true;
    }
    Ok(config)
}

fn run(cli: &Cli) -> Result<String> {
    let config = load_config(cli.config.as_deref(), cli.strict)?;
    debug!(strict = config.strict, "configuration loaded");

    let registry = init_global(config).context("failed to install declared permissions")?;

    let models: Vec<&'static ModelDescriptor> = match &cli.model {
        Some(name) => vec![
            registry
                .descriptor(name)
                .with_context(|| format!("unknown model '{name}'"))?,
        ],
        None => registry
            .registered_models()
            .iter()
            .filter_map(|name| registry.descriptor(name))
            .collect(),
    };
    let roles = cli.role.map_or_else(|| Role::ALL.to_vec(), |role| vec![role]);

    let reports: Vec<ModelReport> = models
        .into_iter()
        .map(|model| ModelReport::build(registry, model, &roles))
        .collect();

    match cli.format {
        Format::Text => Ok(report::render_text(&reports)),
        Format::Json => serde_json::to_string_pretty(&reports).context("failed to render JSON"),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging();

    match run(&cli) {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn cli_parses_filters() {
        let cli = Cli::try_parse_from([
            "permissions-inspector",
            "--model",
            "User",
            "--role",
            "SuperAdmin",
            "--format",
            "json",
            "--strict",
        ])
        .unwrap();

        assert_eq!(cli.model.as_deref(), Some("User"));
        assert_eq!(cli.role, Some(Role::SuperAdmin));
        assert_eq!(cli.format, Format::Json);
        assert!(cli.strict);
    }

    #[test]
    fn cli_rejects_unknown_role() {
        assert!(Cli::try_parse_from(["permissions-inspector", "--role", "root"]).is_err());
    }

    #[test]
    fn missing_config_file_is_an_error() {
        let err = load_config(Some(Path::new("/nonexistent/permissions.yaml")), false).unwrap_err();
        assert!(err.to_string().contains("configuration file not found"));
    }

    #[test]
    fn strict_flag_overrides_file() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        file.write_all(b"strict: false\n").unwrap();

        let config = load_config(Some(file.path()), true).unwrap();
        assert!(config.strict);
    }
}
