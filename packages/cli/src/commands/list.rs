use super::open_index;
use crate::config::Config;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct ListArgs {
    /// Doxygen XML directory (overrides config)
    #[arg(short, long)]
    pub root: Option<PathBuf>,

    /// Only list members of these kinds
    #[arg(short, long = "kind")]
    pub kinds: Vec<String>,
}

/// List indexed members with their kind and refid
pub fn list(args: ListArgs, cwd: &str) -> Result<()> {
    let config = Config::load(cwd)?;
    let index = open_index(args.root, &config, cwd)?;

    let mut count = 0;
    for compound in index.compounds() {
        let members: Vec<_> = compound
            .members()
            .into_iter()
            .filter(|member| args.kinds.is_empty() || args.kinds.iter().any(|kind| kind == member.kind()))
            .collect();
        if members.is_empty() {
            continue;
        }

        println!("{} {}", compound.kind().dimmed(), compound.name().bold());
        for member in members {
            count += 1;
            println!(
                "  {:<10} {:<30} {}",
                member.kind().cyan(),
                member.name(),
                member.id().dimmed()
            );
        }
    }

    eprintln!();
    eprintln!("{} {} members", "Found".green(), count);
    Ok(())
}
