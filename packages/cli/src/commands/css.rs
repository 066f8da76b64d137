use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Args, Debug)]
pub struct CssArgs {
    /// Page file
    pub page: PathBuf,

    /// Output file (stdout when omitted)
    #[arg(short, long)]
    pub out: Option<PathBuf>,
}

pub fn css(args: CssArgs, cwd: &Path) -> Result<()> {
    let (_, _, store) = super::open_page(cwd, &args.page)?;
    let stylesheet = store.stylesheet();

    match args.out {
        Some(out) => {
            let out = super::page_path(cwd, &out);
            if let Some(parent) = out.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&out, &stylesheet)?;
            println!("  {} {} → {}", "✓".green(), args.page.display(), out.display());
        }
        None => print!("{}", stylesheet),
    }

    Ok(())
}
