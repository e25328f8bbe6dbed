//! Config commands

use crate::config::Config;
use crate::output::OutputFormat;
use crate::ConfigCommands;

fn show_value(value: Option<&str>) -> &str {
    value.unwrap_or("(not set)")
}

pub fn handle(action: ConfigCommands, profile: Option<&str>) -> Result<(), String> {
    match action {
        ConfigCommands::Init => {
            let config = Config::load(profile).unwrap_or_default();
            let path = config.save(profile)?;
            println!("Configuration initialized at {}", path.display());
        }
        ConfigCommands::Set { key, value } => {
            let mut config = Config::load(profile).unwrap_or_default();
            match key.as_str() {
                "snapshot" => config.snapshot = Some(value),
                "institution_id" => config.institution_id = Some(value),
                "settings" => config.settings = Some(value),
                "default_format" => {
                    if OutputFormat::from_config(Some(&value)).is_none() {
                        return Err(format!("Unknown output format: {}", value));
                    }
                    config.default_format = Some(value);
                }
                _ => return Err(format!("Unknown config key: {}", key)),
            }
            config.save(profile)?;
            println!("Set {} successfully", key);
        }
        ConfigCommands::Show => {
            let config = Config::load(profile)?;
            println!("snapshot:       {}", config.snapshot_path()?.display());
            println!("institution_id: {}", show_value(config.institution_id.as_deref()));
            println!("default_format: {}", show_value(config.default_format.as_deref()));
            println!("settings:       {}", show_value(config.settings.as_deref()));
        }
    }
    Ok(())
}
