//! `provost config` command handler

use std::io::Write;
use std::path::Path;

use serde::Serialize;
use tracing::info;

use provost_core::config::ProvostConfig;

use crate::cli::{ConfigAction, ConfigArgs};
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `config` command.
pub async fn execute(
    args: ConfigArgs,
    config_path: &Path,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    match args.action {
        ConfigAction::Validate => execute_validate(config_path, writer).await,
        ConfigAction::Show { section } => execute_show(config_path, section, writer).await,
    }
}

/// Load and validate the configuration file, reporting any errors.
async fn execute_validate(config_path: &Path, writer: &OutputWriter) -> Result<(), CliError> {
    info!(path = %config_path.display(), "validating configuration");

    let report = match ProvostConfig::load(config_path).await {
        Ok(_) => ConfigValidationReport {
            source: config_path.display().to_string(),
            valid: true,
            errors: Vec::new(),
        },
        Err(e) => ConfigValidationReport {
            source: config_path.display().to_string(),
            valid: false,
            errors: vec![e.to_string()],
        },
    };

    writer.render(&report)?;

    if !report.valid {
        return Err(CliError::Config("configuration is invalid".to_owned()));
    }
    Ok(())
}

/// Show the effective configuration (file + env overrides + defaults).
async fn execute_show(
    config_path: &Path,
    section: Option<String>,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    info!(path = %config_path.display(), "loading configuration");

    let config = ProvostConfig::load(config_path).await?;

    let config_toml = match section.as_deref() {
        None => toml::to_string_pretty(&config),
        Some("general") => toml::to_string_pretty(&config.general),
        Some("downloader") => toml::to_string_pretty(&config.downloader),
        Some("storage") => toml::to_string_pretty(&config.storage),
        Some("archiver") => toml::to_string_pretty(&config.archiver),
        Some("scanner") => toml::to_string_pretty(&config.scanner),
        Some(unknown) => {
            return Err(CliError::Command(format!(
                "unknown config section '{unknown}' (expected general, downloader, storage, archiver, scanner)"
            )));
        }
    }
    .unwrap_or_else(|e| format!("(serialization error: {e})"));

    writer.render(&ConfigReport {
        source: config_path.display().to_string(),
        section,
        config_toml,
    })?;
    Ok(())
}

/// Validation outcome payload.
#[derive(Debug, Serialize)]
pub struct ConfigValidationReport {
    source: String,
    valid: bool,
    errors: Vec<String>,
}

impl Render for ConfigValidationReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        writeln!(w, "Configuration: {}", self.source)?;
        if self.valid {
            writeln!(w, "Status: valid")?;
        } else {
            writeln!(w, "Status: INVALID")?;
            for error in &self.errors {
                writeln!(w, "  - {error}")?;
            }
        }
        Ok(())
    }
}

/// Effective configuration payload.
#[derive(Debug, Serialize)]
pub struct ConfigReport {
    source: String,
    section: Option<String>,
    config_toml: String,
}

impl Render for ConfigReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        writeln!(w, "Configuration: {}", self.source)?;
        if let Some(section) = &self.section {
            writeln!(w, "Section: [{section}]")?;
        }
        writeln!(w)?;
        write!(w, "{}", self.config_toml)?;
        Ok(())
    }
}
