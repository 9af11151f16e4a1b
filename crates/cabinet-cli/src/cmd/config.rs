use anyhow::Result;
use cabinet_core::config::{Config, WarnLevel};
use std::path::Path;

use crate::output::print_json;

const REDACTED: &str = "********";

pub fn run(config_path: Option<&Path>, json: bool) -> Result<()> {
    let mut config = Config::resolve(config_path)?;
    let warnings = config.validate();
    if config.model.api_key.is_some() {
        config.model.api_key = Some(REDACTED.to_string());
    }

    if json {
        return print_json(&serde_json::json!({
            "config": config,
            "warnings": warnings,
        }));
    }

    print!("{}", serde_yaml::to_string(&config)?);
    if warnings.is_empty() {
        println!("\nConfig OK");
        return Ok(());
    }
    println!();
    for w in &warnings {
        let tag = match w.level {
            WarnLevel::Warning => "WARN",
            WarnLevel::Error => "ERROR",
        };
        println!("[{tag}] {}", w.message);
    }
    Ok(())
}
