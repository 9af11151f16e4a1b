pub mod brief;
pub mod config;
pub mod error;
pub mod history;
pub mod plan;
pub mod rules;
pub mod tasks;
pub mod types;

pub use error::{CabinetError, Result};
