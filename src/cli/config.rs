//! `modelgate config init`

use crate::cli::ConfigInitArgs;
use std::fs;

/// Annotated starter config listing two backends.
const EXAMPLE_CONFIG: &str = include_str!("../../modelgate.example.toml");

/// Write the example config to `args.output`, refusing to replace an
/// existing file unless `--force` is given.
pub fn handle_config_init(args: &ConfigInitArgs) -> Result<(), Box<dyn std::error::Error>> {
    if args.output.exists() && !args.force {
        return Err(format!(
            "{} already exists (pass --force to replace it)",
            args.output.display()
        )
        .into());
    }

    fs::write(&args.output, EXAMPLE_CONFIG)?;

    println!("✓ Wrote example gateway config to {}", args.output.display());
    println!("  The first entry under `backends` is the default route.");

    Ok(())
}
