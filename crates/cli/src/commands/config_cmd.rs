//! `skychat config`: show the effective configuration.

use std::path::Path;

pub fn run(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config(config_path)?;
    print!("{}", config.to_redacted_toml()?);
    if !config.has_api_key() {
        eprintln!("warning: no API key set (CHATGPT_API_KEY)");
    }
    Ok(())
}
