pub mod batch;
pub mod estimate;
pub mod models;

use std::path::{Path, PathBuf};

use crate::config::{self, Config};
use crate::error::Result;
use crate::pricing::{self, PricingTable};

/// Load the effective config, then the pricing table it points at.
///
/// Shared preamble for every command: config discovery, pricing path
/// resolution (flag > env > config > default), all-or-nothing table load.
pub(crate) fn load_environment(
    config_path: Option<&Path>,
    pricing_flag: Option<&Path>,
) -> Result<(Config, PricingTable, PathBuf)> {
    let config = match config::find_config_file(config_path) {
        Some(path) => Config::load(&path)?,
        None => Config::default(),
    };
    let pricing_path = config::resolve_pricing_path(pricing_flag, &config);
    let table = pricing::load_pricing_file(&pricing_path)?;
    Ok((config, table, pricing_path))
}
