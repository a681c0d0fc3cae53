//! Import command - full pipeline rehearsal against the in-memory ledger

use std::path::Path;

use anyhow::Result;
use colored::Colorize;
use foliodesk_core::{RecordKind, TenantScope};
use serde_json::json;

use super::{get_context, parse_kind};
use crate::output;

pub async fn run(file: &Path, kind: &str, tenant: &str, live: bool, json: bool) -> Result<()> {
    let kind = parse_kind(kind)?;
    let ctx = get_context()?;
    let scope = TenantScope::new(tenant, live || ctx.config.live);

    let result = ctx.import_service.import_file(file, kind, &scope).await?;

    let flagged = match kind {
        RecordKind::Transactions => ctx
            .store
            .transactions(&scope)
            .iter()
            .filter(|t| t.is_potential_duplicate)
            .count(),
        RecordKind::Customers => ctx
            .store
            .customers(&scope)
            .iter()
            .filter(|c| c.is_potential_duplicate)
            .count(),
    };

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&json!({
                "result": result,
                "flaggedDuplicates": flagged,
            }))?
        );
        return Ok(());
    }

    println!("{}", "Import rehearsal (in-memory store)".bold());
    println!();

    let mut table = output::create_table();
    table.add_row(vec!["Batch", &result.batch_id.to_string()]);
    table.add_row(vec!["Total rows", &result.total_rows.to_string()]);
    table.add_row(vec!["Processed", &result.processed.to_string()]);
    table.add_row(vec!["Created", &result.created.to_string()]);
    table.add_row(vec!["Updated", &result.updated.to_string()]);
    table.add_row(vec!["Failed", &result.failed.to_string()]);
    table.add_row(vec!["Flagged duplicates", &flagged.to_string()]);
    println!("{}", table);

    if !result.errors.is_empty() {
        println!();
        let mut detail = output::create_table();
        detail.set_header(vec!["Row", "Problems"]);
        for error in &result.errors {
            detail.add_row(vec![error.row.to_string(), error.errors.join("; ")]);
        }
        println!("{}", detail);
    }

    println!();
    if result.success {
        output::success(&format!(
            "Imported {} record(s)",
            result.created + result.updated
        ));
    } else {
        output::error(&format!("{} row(s) failed", result.failed));
    }

    Ok(())
}
