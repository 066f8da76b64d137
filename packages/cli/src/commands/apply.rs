use anyhow::{Context, Result};
use blockpage_common::FileStorage;
use blockpage_editor::{CommandOutcome, EditCommand, PageStore};
use clap::Args;
use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Args, Debug)]
pub struct ApplyArgs {
    /// Page file to edit
    pub page: PathBuf,

    /// Edit script: a JSON array of commands
    pub script: PathBuf,

    /// Write the result here instead of over the page
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// Run the script without saving
    #[arg(long)]
    pub dry_run: bool,
}

/// Tally of one script run
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ApplySummary {
    pub applied: usize,
    pub unchanged: usize,
    pub rejected: usize,
}

pub fn apply(args: ApplyArgs, cwd: &Path) -> Result<()> {
    let (config, page_path, mut store) = super::open_page(cwd, &args.page)?;

    let script_path = super::page_path(cwd, &args.script);
    let source = fs::read_to_string(&script_path)
        .with_context(|| format!("Cannot read script {}", script_path.display()))?;
    let commands: Vec<EditCommand> = serde_json::from_str(&source)
        .with_context(|| format!("Invalid script {}", script_path.display()))?;

    println!(
        "🔧 {} {} commands to {}",
        "Applying".green().bold(),
        commands.len(),
        args.page.display()
    );

    let summary = run_script(&mut store, commands);

    println!();
    println!(
        "   {} applied, {} unchanged, {} rejected",
        summary.applied.to_string().green(),
        summary.unchanged,
        if summary.rejected > 0 {
            summary.rejected.to_string().red()
        } else {
            summary.rejected.to_string().normal()
        }
    );

    if args.dry_run {
        println!("   {}", "(dry run, nothing saved)".dimmed());
        return Ok(());
    }

    let target = match &args.out {
        Some(out) => super::page_path(cwd, out),
        None => page_path,
    };
    let mut storage = FileStorage {
        pretty: config.pretty_output,
    };
    store.save(&mut storage, &target)?;
    println!("✨ {} {}", "Saved".green().bold(), target.display());

    Ok(())
}

/// Dispatch every command in order, printing one line per command
pub fn run_script(store: &mut PageStore, commands: Vec<EditCommand>) -> ApplySummary {
    let mut summary = ApplySummary::default();

    for (index, command) in commands.into_iter().enumerate() {
        let label = op_name(&command);
        let outcome = store.dispatch(command);

        match &outcome {
            CommandOutcome::Applied { created } => {
                summary.applied += 1;
                tracing::info!(index, op = %label, version = store.version(), "applied");
                match created {
                    Some(id) => println!("  {} {} → {}", "✓".green(), label, id.bright_white()),
                    None => println!("  {} {}", "✓".green(), label),
                }
            }
            CommandOutcome::Unchanged => {
                summary.unchanged += 1;
                println!("  {} {} {}", "•".dimmed(), label, "(no change)".dimmed());
            }
            CommandOutcome::Rejected { reason } => {
                summary.rejected += 1;
                println!("  {} {} - {}", "✗".red(), label, reason.red());
            }
        }
    }

    summary
}

fn op_name(command: &EditCommand) -> String {
    serde_json::to_value(command)
        .ok()
        .and_then(|value| value.get("op").and_then(|op| op.as_str()).map(str::to_string))
        .unwrap_or_else(|| "command".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use blockpage_common::PageStorage;
    use blockpage_document::{BlockType, PageDocument};

    const SCRIPT: &str = r#"[
        {"op": "addBlock", "type": "container"},
        {"op": "addBlock", "type": "text", "data": {"content": "Hi"}, "path": "0-0"},
        {"op": "removeBlock", "id": "missing"},
        {"op": "setBreakpoint", "breakpoint": "default"}
    ]"#;

    #[test]
    fn test_run_script_tallies_outcomes() {
        let mut store = PageStore::default();
        let commands: Vec<EditCommand> = serde_json::from_str(SCRIPT).unwrap();

        let summary = run_script(&mut store, commands);

        assert_eq!(
            summary,
            ApplySummary {
                applied: 2,
                unchanged: 1,
                rejected: 1,
            }
        );
        assert_eq!(store.blocks()[0].blocks[0].content, "Hi");
    }

    #[test]
    fn test_apply_saves_page() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = FileStorage::new();
        storage.save(&dir.path().join("page.json"), &PageDocument::new()).unwrap();
        fs::write(dir.path().join("script.json"), SCRIPT).unwrap();

        apply(
            ApplyArgs {
                page: "page.json".into(),
                script: "script.json".into(),
                out: Some("out/page.json".into()),
                dry_run: false,
            },
            dir.path(),
        )
        .unwrap();

        let saved = storage.load(&dir.path().join("out/page.json")).unwrap();
        assert_eq!(saved.blocks.len(), 1);
        assert_eq!(saved.blocks[0].kind, BlockType::Container);
        assert_eq!(saved.blocks[0].blocks[0].content, "Hi");

        // Original page untouched
        assert!(storage.load(&dir.path().join("page.json")).unwrap().blocks.is_empty());
    }

    #[test]
    fn test_op_name() {
        assert_eq!(op_name(&EditCommand::PasteBlock), "pasteBlock");
    }
}
