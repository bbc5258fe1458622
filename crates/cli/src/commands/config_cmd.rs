//! `wayfarer config`: print the default or effective configuration.

use wayfarer_config::AppConfig;

pub fn run(effective: bool, path: bool) -> Result<(), Box<dyn std::error::Error>> {
    if path {
        println!("{}", config_path().display());
        return Ok(());
    }

    if effective {
        let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
        println!("{}", effective_toml(config)?);
    } else {
        println!("{}", AppConfig::default_toml());
    }
    Ok(())
}

fn config_path() -> std::path::PathBuf {
    AppConfig::config_dir().join("config.toml")
}

/// The loaded config as TOML, with credentials left out.
fn effective_toml(mut config: AppConfig) -> Result<String, toml::ser::Error> {
    config.model.api_key = None;
    config.search.app_key = None;
    toml::to_string_pretty(&config)
}
