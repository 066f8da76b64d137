use anyhow::Result;
use blockpage_common::{walk_block, walk_form, Visitor};
use blockpage_document::{Block, BlockPath, FormFieldConfig, FormItem, PageDocument};
use clap::Args;
use colored::Colorize;
use std::path::{Path, PathBuf};

#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Page file to inspect
    pub page: PathBuf,

    /// Output format (text, json)
    #[arg(short, long, default_value = "text")]
    pub format: String,
}

pub fn inspect(args: InspectArgs, cwd: &Path) -> Result<()> {
    let (_, path, store) = super::open_page(cwd, &args.page)?;

    match args.format.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(store.page())?),
        "text" => {
            println!("📄 {} {}", "Page".green().bold(), path.display());
            println!();
            for line in outline(store.page()) {
                println!("{}", line);
            }
        }
        other => return Err(anyhow::anyhow!("Unknown format: {}. Use: text or json", other)),
    }

    Ok(())
}

/// Tree outline, one line per block, form and field
pub fn outline(page: &PageDocument) -> Vec<String> {
    let mut printer = OutlinePrinter::default();
    printer.visit_page(page);
    printer.lines
}

#[derive(Default)]
struct OutlinePrinter {
    lines: Vec<String>,
}

impl Visitor for OutlinePrinter {
    fn visit_block(&mut self, block: &Block, path: &BlockPath) {
        let indent = "  ".repeat(path.depth().saturating_sub(1));
        let mut line = format!(
            "{}{} {} {}",
            indent,
            path.to_string().cyan(),
            block.kind.as_str().bold(),
            block.id.dimmed()
        );
        if !block.content.is_empty() {
            line.push_str(&format!(" \"{}\"", preview(&block.content)));
        }
        if block.allow_nesting && block.blocks.is_empty() {
            line.push_str(&format!(" {}", "(empty)".dimmed()));
        }
        self.lines.push(line);
        walk_block(self, block, path);
    }

    fn visit_form(&mut self, form: &FormItem) {
        self.lines.push(format!(
            "{} {} {} ({} fields)",
            "form".magenta().bold(),
            form.name,
            form.id.dimmed(),
            form.fields.len()
        ));
        walk_form(self, form);
    }

    fn visit_field(&mut self, field: &FormFieldConfig) {
        let required = if field.required { "*" } else { "" };
        self.lines.push(format!(
            "  {}{} {} {}",
            field.name,
            required,
            field.kind.default_label().dimmed(),
            field.id.dimmed()
        ));
    }
}

fn preview(content: &str) -> String {
    const MAX: usize = 40;
    let flat = content.replace('\n', " ");
    if flat.chars().count() <= MAX {
        flat
    } else {
        format!("{}…", flat.chars().take(MAX).collect::<String>())
    }
}
