use anyhow::Result;
use cabinet_core::config::{Config, WarnLevel};
use std::path::Path;

pub fn run(config_path: Option<&Path>, port: u16) -> Result<()> {
    let config = Config::resolve(config_path)?;
    for warning in config.validate() {
        match warning.level {
            WarnLevel::Warning => tracing::warn!("{}", warning.message),
            WarnLevel::Error => tracing::error!("{}", warning.message),
        }
    }

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(cabinet_server::serve(&config, port))
}
