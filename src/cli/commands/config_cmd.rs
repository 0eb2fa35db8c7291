//! Configuration management commands.

use urtica::config::{Config, Settings};

use crate::cli::icons::{dim_arrow, warn};

/// Print the effective settings as TOML.
pub async fn cmd_config_show(settings: &Settings, config: &Config) -> anyhow::Result<()> {
    match config.source_path {
        Some(ref path) => eprintln!("{} Config file: {}", dim_arrow(), path.display()),
        None => eprintln!("{} No config file found, showing defaults", warn()),
    }

    print!("{}", settings.to_toml()?);
    Ok(())
}
