//! Config command handler.
//!
//! Manages `<home>/.env` overrides and prints the profile template.

use std::path::Path;

use anyhow::Result;

use ddi_core::InferenceProfile;
use ddi_core::paths::{
    ConfigKey, normalize_user_path, persist_env_value, read_env_values, remove_env_value,
};

use crate::bootstrap::CliContext;
use crate::config_commands::ConfigCommand;
use crate::error::CliError;

/// Execute the config command.
pub fn execute(ctx: &CliContext, command: ConfigCommand) -> Result<()> {
    match command {
        ConfigCommand::Show => show(&ctx.env_file),
        ConfigCommand::Set { key, value } => {
            let (key, stored) = set(&ctx.env_file, &key, &value)?;
            println!("✓ {} = {stored}", key.env_var());
            Ok(())
        }
        ConfigCommand::Unset { key } => {
            let key: ConfigKey = key.parse().map_err(CliError::from)?;
            if unset(&ctx.env_file, key)? {
                println!("✓ Removed {}", key.env_var());
            } else {
                println!("{} was not set in {}", key.env_var(), ctx.env_file.display());
            }
            Ok(())
        }
        ConfigCommand::ProfileTemplate => {
            println!("{}", InferenceProfile::default().to_json_pretty());
            Ok(())
        }
    }
}

fn show(env_file: &Path) -> Result<()> {
    println!("env_file = {}", env_file.display());
    let values = read_env_values(env_file).map_err(CliError::from)?;
    if values.is_empty() {
        println!("(no persisted values)");
    }
    for key in ConfigKey::ALL {
        if let Some((_, value)) = values.iter().rev().find(|(k, _)| k == key.env_var()) {
            println!("{} = {value}", key.env_var());
        }
    }
    Ok(())
}

/// Persist a value; path-valued keys are stored absolute.
fn set(env_file: &Path, raw_key: &str, value: &str) -> Result<(ConfigKey, String), CliError> {
    let key: ConfigKey = raw_key.parse()?;
    let stored = match key {
        ConfigKey::Python if !value.contains('/') && !value.contains('\\') => {
            value.trim().to_string()
        }
        _ => normalize_user_path(value)?.to_string_lossy().into_owned(),
    };
    if stored.is_empty() {
        return Err(CliError::Arguments(format!(
            "{} cannot be empty",
            key.cli_name()
        )));
    }
    persist_env_value(env_file, key.env_var(), &stored)?;
    Ok((key, stored))
}

fn unset(env_file: &Path, key: ConfigKey) -> Result<bool, CliError> {
    Ok(remove_env_value(env_file, key.env_var())?)
}
