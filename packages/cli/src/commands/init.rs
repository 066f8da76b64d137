use crate::config::{Config, DEFAULT_CONFIG_NAME};
use anyhow::Result;
use blockpage_common::{FileStorage, PageStorage};
use blockpage_document::{Breakpoint, PageDocument};
use clap::Args;
use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Page file to create
    #[arg(short, long, default_value = "page.json")]
    pub page: PathBuf,

    /// Breakpoint commands use when none is given
    #[arg(short, long, default_value = "default")]
    pub breakpoint: Breakpoint,

    /// Force overwrite existing config and page
    #[arg(short, long)]
    pub force: bool,
}

pub fn init(args: InitArgs, cwd: &Path) -> Result<()> {
    let config_path = cwd.join(DEFAULT_CONFIG_NAME);

    // Check if config already exists
    if config_path.exists() && !args.force {
        println!(
            "{} {} already exists",
            "⚠️".yellow(),
            DEFAULT_CONFIG_NAME.bright_white()
        );
        println!("Use --force to overwrite");
        return Ok(());
    }

    println!("{}", "📝 Initializing Blockpage project...".bright_blue().bold());

    let config = Config {
        default_breakpoint: args.breakpoint,
        ..Config::default()
    };
    fs::write(&config_path, serde_json::to_string_pretty(&config)?)?;
    println!("  {} Created {}", "✓".green(), DEFAULT_CONFIG_NAME);

    let page_path = super::page_path(cwd, &args.page);
    let mut storage = FileStorage {
        pretty: config.pretty_output,
    };
    if storage.exists(&page_path) && !args.force {
        println!("  {} Kept existing {}", "•".dimmed(), args.page.display());
    } else {
        storage.save(&page_path, &PageDocument::new())?;
        println!("  {} Created {}", "✓".green(), args.page.display());
    }

    println!();
    println!("{}", "✅ Project initialized!".green().bold());
    println!();
    println!("Next steps:");
    println!("  1. Write an edit script (a JSON array of commands)");
    println!("  2. Run: blockpage apply {} script.json", args.page.display());
    println!("  3. Run: blockpage inspect {}", args.page.display());

    Ok(())
}
