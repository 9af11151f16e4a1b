use anyhow::{bail, Result};
use cabinet_core::tasks::{map_to_canonical, vocabulary_prompt};

use crate::output::print_json;

pub fn run(raw: &str, json: bool) -> Result<()> {
    let Some(task) = map_to_canonical(Some(raw)) else {
        bail!("'{raw}' does not map to a known task (known: {})", vocabulary_prompt());
    };

    if json {
        print_json(&serde_json::json!({ "raw": raw, "task": task.as_str() }))
    } else {
        println!("{task}");
        Ok(())
    }
}
