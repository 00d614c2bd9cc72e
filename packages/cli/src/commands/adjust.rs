use super::{lookup, open_index};
use crate::config::Config;
use aerate_recipes::adjuster;
use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct AdjustArgs {
    /// Member or compound to adjust, by refid or name
    pub target: String,

    /// Doxygen XML directory (overrides config)
    #[arg(short, long)]
    pub root: Option<PathBuf>,
}

/// Print the canonicalized definition of one member or compound
pub fn adjust(args: AdjustArgs, cwd: &str) -> Result<()> {
    let config = Config::load(cwd)?;
    let index = open_index(args.root, &config, cwd)?;
    let aeration = lookup(&index, &args.target)?;

    let mut matter = aeration.matter()?;
    adjuster::adjust(&mut matter.document, matter.node)?;
    println!("{}", matter.document.to_xml(matter.node));
    Ok(())
}
