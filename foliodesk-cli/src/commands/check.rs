//! Check command - per-row validation report, no store involved

use std::path::Path;

use anyhow::{bail, Result};
use chrono::Utc;
use colored::Colorize;
use foliodesk_core::domain::{map_customer_row, map_transaction_row};
use foliodesk_core::services::{validate_customer, validate_transaction};
use foliodesk_core::{RecordKind, ValidationResult};
use serde_json::json;

use super::{get_context, parse_kind};
use crate::output;

pub fn run(file: &Path, kind: &str, json: bool) -> Result<()> {
    let kind = parse_kind(kind)?;
    let ctx = get_context()?;

    let parsed = ctx.parser.parse_path(file, &Default::default());
    if parsed.is_structural_failure() {
        bail!(parsed.errors.join("; "));
    }

    let today = Utc::now().date_naive();
    let mut valid = 0usize;
    let mut reports: Vec<(usize, ValidationResult)> = Vec::new();

    for (index, row) in parsed.rows.iter().enumerate() {
        let result = match kind {
            RecordKind::Transactions => {
                validate_transaction(&map_transaction_row(row, &parsed.headers), today)
            }
            RecordKind::Customers => {
                validate_customer(&map_customer_row(row, &parsed.headers), today)
            }
        };
        if result.is_valid {
            valid += 1;
        }
        if !result.errors.is_empty() || !result.warnings.is_empty() {
            reports.push((index + 1, result));
        }
    }

    let invalid = parsed.rows.len() - valid;

    if json {
        let rows: Vec<serde_json::Value> = reports
            .iter()
            .map(|(row, result)| {
                json!({
                    "row": row,
                    "isValid": result.is_valid,
                    "errors": result.errors,
                    "warnings": result.warnings,
                })
            })
            .collect();
        println!(
            "{}",
            serde_json::to_string_pretty(&json!({
                "totalRows": parsed.total_rows,
                "checked": parsed.rows.len(),
                "valid": valid,
                "invalid": invalid,
                "parseErrors": parsed.errors,
                "rows": rows,
            }))?
        );
        return Ok(());
    }

    println!("{}", file.display().to_string().bold());
    println!();

    let mut table = output::create_table();
    table.add_row(vec!["Rows checked", &parsed.rows.len().to_string()]);
    table.add_row(vec!["Valid", &valid.to_string()]);
    table.add_row(vec!["Invalid", &invalid.to_string()]);
    println!("{}", table);

    if !parsed.errors.is_empty() {
        println!();
        for e in &parsed.errors {
            output::warning(e);
        }
    }

    if !reports.is_empty() {
        println!();
        let mut detail = output::create_table();
        detail.set_header(vec!["Row", "Errors", "Warnings"]);
        for (row, result) in &reports {
            detail.add_row(vec![
                row.to_string(),
                result.errors.join("; "),
                result.warnings.join("; "),
            ]);
        }
        println!("{}", detail);
    }

    println!();
    if invalid == 0 {
        output::success("All rows passed validation");
    } else {
        output::error(&format!("{} row(s) failed validation", invalid));
    }

    Ok(())
}
