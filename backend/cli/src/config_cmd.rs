//! `lcforge config` subcommands.

use std::path::Path;

use anyhow::{Context, Result};
use clap::Subcommand;
use lcforge_config::{apply_all_defaults, redact, write_config, LcForgeConfig};

use crate::runtime::{runtime_report, Runtime};
use crate::terminal_output::{note_error, note_info, note_success, note_warn};

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the effective config with secrets masked
    Show,
    /// Validate the config and list any problems
    Check,
    /// Write a starter config file with every default filled in
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Returns false when the command found a problem.
pub async fn run(cmd: ConfigCommands, runtime: &Runtime) -> Result<bool> {
    match cmd {
        ConfigCommands::Show => {
            note_info(&format!("Config file: {}", runtime.path.display()));
            println!("{}", render_redacted(&runtime.config)?);
            Ok(true)
        }
        ConfigCommands::Check => {
            let report = runtime_report(&runtime.config);
            for warning in &report.warnings {
                note_warn(&format!("{}: {}", warning.path, warning.message));
            }
            for error in &report.errors {
                note_error(&format!("{}: {}", error.path, error.message));
            }
            if report.is_valid() {
                note_success(&format!("{} is valid", runtime.path.display()));
            }
            Ok(report.is_valid())
        }
        ConfigCommands::Init { force } => init(&runtime.path, force).await,
    }
}

fn render_redacted(config: &LcForgeConfig) -> Result<String> {
    let value = serde_json::to_value(config).context("Failed to serialize config")?;
    serde_yaml::to_string(&redact(&value)).context("Failed to render config as YAML")
}

async fn init(path: &Path, force: bool) -> Result<bool> {
    if path.exists() && !force {
        note_warn(&format!(
            "{} already exists; pass --force to overwrite",
            path.display()
        ));
        return Ok(false);
    }
    write_config(&apply_all_defaults(LcForgeConfig::default()), path).await?;
    note_success(&format!("Wrote {}", path.display()));
    Ok(true)
}
