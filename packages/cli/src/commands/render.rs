use super::{lookup, open_index};
use crate::config::Config;
use aerate_index::{Aeration, DoxygenIndex};
use aerate_recipes::{aerate, renderer};
use anyhow::{anyhow, Result};
use clap::Args;
use colored::Colorize;
use std::fs;
use std::path::PathBuf;
use std::rc::Rc;
use tracing::info;

#[derive(Debug, Args)]
pub struct RenderArgs {
    /// Members to render, by refid or name (defaults to every member of the
    /// configured kinds)
    pub members: Vec<String>,

    /// Doxygen XML directory (overrides config)
    #[arg(short, long)]
    pub root: Option<PathBuf>,

    /// Member kinds to render (overrides config)
    #[arg(short, long = "kind")]
    pub kinds: Vec<String>,

    /// Output file (overrides config)
    #[arg(short, long)]
    pub out_file: Option<PathBuf>,

    /// Write to stdout even if the config names an output file
    #[arg(long)]
    pub stdout: bool,
}

pub fn render(args: RenderArgs, cwd: &str) -> Result<()> {
    let config = Config::load(cwd)?;
    let index = Rc::new(open_index(args.root, &config, cwd)?);
    let engine = renderer::engine(Box::new(Rc::clone(&index)))?;

    let members = if args.members.is_empty() {
        let kinds = if args.kinds.is_empty() {
            config.kinds.clone()
        } else {
            args.kinds
        };
        members_of_kinds(&index, &kinds)
    } else {
        args.members
            .iter()
            .map(|target| lookup(&index, target))
            .collect::<Result<Vec<_>>>()?
    };

    eprintln!("{}", "Rendering Doxygen members...".bright_blue().bold());
    if members.is_empty() {
        eprintln!("{}", "No members found".yellow());
        return Ok(());
    }

    let mut output = String::new();
    let mut success_count = 0;
    let mut error_count = 0;

    for member in &members {
        let rendered = member
            .matter()
            .map_err(anyhow::Error::from)
            .and_then(|mut matter| {
                Ok(aerate(&mut matter.document, matter.node, &engine)?)
            });
        match rendered {
            Ok(rendered) => {
                success_count += 1;
                output.push_str(&rendered);
                eprintln!("  {} {} {}", "✓".green(), member.kind().dimmed(), member.name());
            }
            Err(e) => {
                error_count += 1;
                eprintln!(
                    "  {} {} {} - {}",
                    "✗".red(),
                    member.kind().dimmed(),
                    member.name(),
                    e.to_string().red()
                );
            }
        }
    }

    let out_file = match (args.stdout, args.out_file) {
        (true, _) => None,
        (false, Some(path)) => Some(path),
        (false, None) => config.out_file.map(|path| PathBuf::from(cwd).join(path)),
    };
    match out_file {
        Some(path) => {
            fs::write(&path, &output)
                .map_err(|e| anyhow!("Cannot write {}: {}", path.display(), e))?;
            info!(path = %path.display(), bytes = output.len(), "Wrote output");
        }
        None => print!("{output}"),
    }

    eprintln!();
    if error_count == 0 {
        eprintln!("{} Rendered {} members", "✅".green(), success_count);
        Ok(())
    } else {
        eprintln!(
            "{} Rendered {} members, {} errors",
            "⚠️".yellow(),
            success_count,
            error_count
        );
        Err(anyhow!("{error_count} members failed to render"))
    }
}

/// Members of the given kinds, each kind in index order
fn members_of_kinds<'a>(index: &'a DoxygenIndex, kinds: &[String]) -> Vec<Aeration<'a>> {
    kinds
        .iter()
        .flat_map(|kind| index.members_of_kind(kind))
        .collect()
}
