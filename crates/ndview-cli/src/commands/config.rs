use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use crate::session::Session;

#[derive(Args)]
pub struct ConfigArgs {
    /// Write the session to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Print or save an example session as TOML.
pub fn run(args: &ConfigArgs) -> Result<()> {
    let toml_str = Session::example().to_toml_string()?;

    if let Some(ref path) = args.output {
        std::fs::write(path, &toml_str)
            .with_context(|| format!("Failed to write session to {}", path.display()))?;
        println!("Example session saved to {}", path.display());
    } else {
        print!("{}", toml_str);
    }

    Ok(())
}
