use anyhow::{anyhow, Result};
use blockpage_document::Breakpoint;
use blockpage_editor::PageStore;
use clap::Args;
use colored::Colorize;
use std::path::{Path, PathBuf};

#[derive(Args, Debug)]
pub struct ResolveArgs {
    /// Page file
    pub page: PathBuf,

    /// Block id
    pub id: String,

    /// Breakpoint to resolve at (config default when omitted)
    #[arg(short, long)]
    pub breakpoint: Option<Breakpoint>,

    /// Resolve at every breakpoint
    #[arg(short, long, conflicts_with = "breakpoint")]
    pub all: bool,

    /// Print `a: b; c: d` instead of one declaration per line
    #[arg(long)]
    pub inline: bool,
}

pub fn resolve(args: ResolveArgs, cwd: &Path) -> Result<()> {
    let (_, _, mut store) = super::open_page(cwd, &args.page)?;

    if store.block(&args.id).is_none() {
        return Err(anyhow!("No block with id {} in {}", args.id, args.page.display()));
    }

    let breakpoints = if args.all {
        Breakpoint::ALL.to_vec()
    } else {
        vec![args.breakpoint.unwrap_or_else(|| store.current_breakpoint())]
    };

    for breakpoint in breakpoints {
        store.set_breakpoint(breakpoint);
        println!("{} {}", "@".cyan(), breakpoint.as_str().cyan().bold());
        for line in render(&store, &args.id, args.inline) {
            println!("  {}", line);
        }
    }

    Ok(())
}

/// Resolved declarations of one block at the store's current breakpoint
fn render(store: &PageStore, id: &str, inline: bool) -> Vec<String> {
    let Some(style) = store.resolved_style(id) else {
        return vec![];
    };
    if style.is_empty() {
        return vec!["(no styles)".dimmed().to_string()];
    }
    if inline {
        return vec![style.to_inline_css()];
    }
    style
        .iter()
        .map(|(property, value)| format!("{}: {};", property, value))
        .collect()
}
