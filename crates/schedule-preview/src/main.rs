use std::fs;
use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use serde::Serialize;

use seikyu_automation::{resolve_rows, stamp_draft, ResolvedRow, RunContext};
use seikyu_model::{InvoiceDraft, ScheduleDoc};

#[derive(Clone, Debug, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Parser)]
#[command(
    about = "Resolve a recurring-invoice schedule's block grid outside the web app, row by row."
)]
struct Args {
    /// Schedule document (JSON, as persisted).
    schedule: PathBuf,

    /// Template draft document (JSON). Requires `--run-date`.
    #[arg(long, requires = "run_date")]
    template: Option<PathBuf>,

    /// Run date (`YYYY-MM-DD`) to stamp the template draft for.
    #[arg(long = "run-date")]
    run_date: Option<String>,

    /// Only show the first N rows of the grid.
    #[arg(long)]
    rows: Option<usize>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonReport<'a> {
    schedule: &'a str,
    block_keys: &'a [String],
    rows: &'a [ResolvedRow],
    #[serde(skip_serializing_if = "Option::is_none")]
    stamped_draft: Option<&'a InvoiceDraft>,
}

fn load_json<T: serde::de::DeserializeOwned>(path: &PathBuf) -> Result<T> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

fn main() -> Result<()> {
    let args = Args::parse();

    let schedule: ScheduleDoc = load_json(&args.schedule)?;

    let mut rows = resolve_rows(&schedule.block_keys, &schedule.block_rows);
    if let Some(limit) = args.rows {
        rows.truncate(limit);
    }

    let stamped = match (&args.template, &args.run_date) {
        (Some(template_path), Some(run_date)) => {
            let template: InvoiceDraft = load_json(template_path)?;
            let ctx = RunContext {
                schedule_id: "(preview)",
                template_draft_id: &schedule.template_draft_id,
                run_date,
            };
            Some(
                stamp_draft(&schedule, &template, &ctx)
                    .with_context(|| format!("stamping for {run_date}"))?,
            )
        }
        _ => None,
    };

    match args.format {
        OutputFormat::Text => {
            println!("Schedule: {}", schedule.name);
            println!("  next run: {}", schedule.next_run_date);
            println!("  blocks:   {}", schedule.block_keys.join(", "));
            println!();

            if rows.is_empty() {
                println!("No block rows configured.");
            }
            for row in &rows {
                println!("{}", row.run_date);
                for key in &schedule.block_keys {
                    let value = row.values.get(key).map(String::as_str).unwrap_or("");
                    println!("  {key} = {value}");
                }
            }

            if let Some(draft) = &stamped {
                println!();
                println!("Stamped draft for {}", draft.issue_date);
                println!("  subject:  {}", draft.subject);
                for item in &draft.items {
                    println!(
                        "  item:     {} x{} @{} = {}",
                        item.name, item.qty, item.unit_price, item.amount
                    );
                }
                if let Some(due) = &draft.due_date {
                    println!("  due:      {due}");
                }
                println!("  subtotal: {}", draft.sub_total);
                println!("  tax:      {}", draft.tax_total);
                println!("  total:    {}", draft.grand_total);
            }
            Ok(())
        }
        OutputFormat::Json => {
            let report = JsonReport {
                schedule: &schedule.name,
                block_keys: &schedule.block_keys,
                rows: &rows,
                stamped_draft: stamped.as_ref(),
            };
            let stdout = std::io::stdout();
            let mut handle = stdout.lock();
            serde_json::to_writer_pretty(&mut handle, &report)?;
            handle.write_all(b"\n")?;
            Ok(())
        }
    }
}
