//! Inspect command - file stats, format check and sample preview

use std::path::Path;

use anyhow::{bail, Result};
use colored::Colorize;
use foliodesk_core::services::ParseOptions;
use serde_json::json;

use super::get_context;
use crate::output;

pub fn run(file: &Path, rows: usize, json: bool) -> Result<()> {
    let ctx = get_context()?;

    let check = ctx.parser.validate_format(file);
    if !check.is_valid {
        if json {
            println!("{}", serde_json::to_string_pretty(&json!({ "formatCheck": check }))?);
        } else {
            for e in &check.errors {
                output::error(e);
            }
        }
        bail!("{} failed the format check", file.display());
    }

    let stats = ctx.parser.file_stats(file)?;
    let options = ParseOptions {
        max_rows: Some(rows),
        ..Default::default()
    };
    let parsed = ctx.parser.parse_path(file, &options);

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&json!({
                "stats": stats,
                "formatCheck": check,
                "headers": parsed.headers,
                "sample": parsed.rows,
                "errors": parsed.errors,
            }))?
        );
        return Ok(());
    }

    println!("{}", file.display().to_string().bold());
    println!();

    let mut table = output::create_table();
    table.add_row(vec!["Rows", &stats.total_rows.to_string()]);
    table.add_row(vec!["Columns", &stats.total_columns.to_string()]);
    table.add_row(vec!["Size", &output::format_size(stats.file_size)]);
    println!("{}", table);
    println!();

    output::success("Format check passed");

    if !parsed.errors.is_empty() {
        println!();
        for e in &parsed.errors {
            output::warning(e);
        }
    }

    if !parsed.rows.is_empty() {
        println!();
        let mut sample = output::create_table();
        sample.set_header(parsed.headers.clone());
        for row in &parsed.rows {
            let cells: Vec<String> = parsed
                .headers
                .iter()
                .map(|h| row.get(h).map(|c| c.render()).unwrap_or_default())
                .collect();
            sample.add_row(cells);
        }
        println!("{}", sample);

        if parsed.total_rows > parsed.rows.len() {
            println!();
            println!(
                "Showing {} of {} rows",
                parsed.rows.len(),
                parsed.total_rows
            );
        }
    }

    Ok(())
}
