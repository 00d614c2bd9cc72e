pub mod adjust;
pub mod list;
pub mod render;

pub use adjust::{adjust, AdjustArgs};
pub use list::{list, ListArgs};
pub use render::{render, RenderArgs};

use crate::config::Config;
use aerate_index::{Aeration, DoxygenIndex};
use anyhow::{anyhow, Context, Result};
use std::path::PathBuf;

/// Load the index from `root`, or from the configured directory
fn open_index(root: Option<PathBuf>, config: &Config, cwd: &str) -> Result<DoxygenIndex> {
    let root = root.unwrap_or_else(|| config.get_doxygen_root(cwd));
    if !root.is_dir() {
        return Err(anyhow!("Doxygen XML directory does not exist: {}", root.display()));
    }
    DoxygenIndex::load(&root)
        .with_context(|| format!("Cannot load the Doxygen index in {}", root.display()))
}

/// Look a member or compound up by refid, then by member name
fn lookup<'a>(index: &'a DoxygenIndex, target: &str) -> Result<Aeration<'a>> {
    index
        .get(target)
        .or_else(|| index.find_member_by_name(target))
        .ok_or_else(|| anyhow!("No compound or member named {target:?}"))
}
