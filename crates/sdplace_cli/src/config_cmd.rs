//! `sdplace config`: prints the effective placer configuration.

use std::path::Path;

use sdplace_config::PlacerConfig;

use crate::pipeline::load_placer_config;
use crate::{ConfigArgs, GlobalArgs};

/// Runs the `sdplace config` command.
pub fn run(args: &ConfigArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let config = load_placer_config(global)?;
    execute(args, &config, global)
}

fn execute(
    args: &ConfigArgs,
    config: &PlacerConfig,
    global: &GlobalArgs,
) -> Result<i32, Box<dyn std::error::Error>> {
    let text = config.to_toml_string()?;
    match &args.output {
        Some(path) => {
            std::fs::write(Path::new(path), &text)?;
            if !global.quiet {
                eprintln!("   Wrote {path}");
            }
        }
        None => print!("{text}"),
    }
    Ok(0)
}
