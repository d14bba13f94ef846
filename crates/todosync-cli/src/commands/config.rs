use std::path::Path;

use todosync_core::util::{is_http_url, normalize_text_option};

use crate::cli::ConfigCommands;
use crate::config_file::CliConfig;
use crate::error::CliError;

pub fn run_config(command: ConfigCommands, config_path: &Path) -> Result<(), CliError> {
    match command {
        ConfigCommands::Init {
            api_url,
            token,
            user,
            timeout,
        } => {
            run_config_init(config_path, api_url, token, user, timeout)?;
            Ok(())
        }
        ConfigCommands::Show => run_config_show(config_path),
    }
}

pub fn run_config_init(
    config_path: &Path,
    api_url: Option<String>,
    token: Option<String>,
    user: Option<String>,
    timeout: Option<u64>,
) -> Result<CliConfig, CliError> {
    let mut config = CliConfig::load_from_path(config_path).map_err(CliError::Config)?;

    if let Some(url) = normalize_text_option(api_url) {
        if !is_http_url(&url) {
            return Err(CliError::Config(
                "api_url must include http:// or https://".to_string(),
            ));
        }
        config.sync.api_base_url = Some(url);
    }
    if let Some(token) = normalize_text_option(token) {
        config.sync.api_token = Some(token);
    }
    if let Some(user) = normalize_text_option(user) {
        config.sync.user_id = Some(user);
    }
    if let Some(timeout) = timeout {
        config.sync.timeout_secs = Some(timeout);
    }
    config.sync.normalize();

    config.save_to_path(config_path).map_err(CliError::Config)?;
    println!("Configuration saved to {}", config_path.display());

    let mut missing_fields = Vec::new();
    if config.sync.api_base_url.is_none() {
        missing_fields.push("api_url");
    }
    if config.sync.user_id.is_none() {
        missing_fields.push("user");
    }
    if missing_fields.is_empty() {
        println!("Sync is ready. Run `todosync sync`.");
    } else {
        println!("Configuration is missing: {}", missing_fields.join(", "));
    }

    Ok(config)
}

pub fn run_config_show(config_path: &Path) -> Result<(), CliError> {
    let config = CliConfig::load_from_path(config_path).map_err(CliError::Config)?;
    println!("{}", serde_json::to_string_pretty(&config.redacted())?);
    Ok(())
}
