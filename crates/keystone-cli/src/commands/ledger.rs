//! Ledger snapshot commands

use std::path::Path;
use std::process::ExitCode;

use keystone_ledger::LedgerExport;

use super::Session;
use crate::error::CliResult;
use crate::output::{self, print_success, FieldRow, OutputFormat};

pub fn export(session: &Session, path: &Path) -> CliResult<ExitCode> {
    let (orch, _) = session.boot()?;
    let export = orch.ledger().export();
    std::fs::write(path, export.to_json_pretty()?)?;
    tracing::info!(path = %path.display(), blocks = export.blocks.len(), "Ledger exported");

    let rows = vec![
        FieldRow::new("path", path.display()),
        FieldRow::new("state", export.state),
        FieldRow::new("blocks", export.blocks.len()),
    ];
    output::print_rows(&export.certificate, rows, session.format)?;
    if session.format == OutputFormat::Table {
        print_success("Ledger snapshot written");
    }
    Ok(ExitCode::SUCCESS)
}

pub fn verify(session: &Session, path: &Path) -> CliResult<ExitCode> {
    let contents = std::fs::read_to_string(path)?;
    let export = LedgerExport::from_json(&contents)?;
    let result = export.verify();

    let rows = vec![
        FieldRow::new("valid", result.valid),
        FieldRow::new(
            "violating index",
            result
                .violating_index
                .map_or_else(|| "-".to_string(), |i| i.to_string()),
        ),
        FieldRow::new(
            "seal valid",
            result
                .seal_valid
                .map_or_else(|| "-".to_string(), |v| v.to_string()),
        ),
        FieldRow::new("reason", result.reason.as_deref().unwrap_or("-")),
    ];
    output::print_rows(&result, rows, session.format)?;

    Ok(if result.valid {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
