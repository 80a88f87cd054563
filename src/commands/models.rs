//! Handler for the `tokenmeter models` command.

use std::path::PathBuf;

use crate::error::Result;
use crate::output::{self, Format};

/// All inputs needed to run the models command.
#[derive(Debug)]
pub struct ModelsCommandOptions {
    pub pricing: Option<PathBuf>,
    pub config_path: Option<PathBuf>,
    pub format: Format,
    /// Suppress non-essential output.
    pub quiet: bool,
}

/// Run the models command: print the current pricing table.
pub fn run(options: ModelsCommandOptions) -> Result<()> {
    let (_, table, _) =
        super::load_environment(options.config_path.as_deref(), options.pricing.as_deref())?;
    print!(
        "{}",
        output::format_models(&table, options.format, options.quiet)?
    );
    Ok(())
}
