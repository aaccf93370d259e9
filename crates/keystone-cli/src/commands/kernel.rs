//! Orchestrator commands

use std::process::ExitCode;

use colored::Colorize;
use keystone_kernel::{AuditReport, CheckResult};
use tabled::Tabled;

use super::Session;
use crate::error::CliResult;
use crate::output::{self, print_success, print_warning, FieldRow, OutputFormat};

#[derive(Debug, Tabled)]
struct StepRow {
    step: usize,
    name: String,
    status: String,
}

#[derive(Debug, Tabled)]
struct CheckRow {
    check: String,
    result: String,
    detail: String,
}

impl From<&CheckResult> for CheckRow {
    fn from(c: &CheckResult) -> Self {
        let result = if c.passed {
            "PASS".green().to_string()
        } else {
            "FAIL".red().to_string()
        };
        Self {
            check: c.name.to_string(),
            result,
            detail: c.detail.clone(),
        }
    }
}

pub fn init(session: &Session) -> CliResult<ExitCode> {
    let (_orch, report) = session.boot()?;

    let rows: Vec<StepRow> = report
        .completed_steps
        .iter()
        .map(|s| StepRow {
            step: s.number(),
            name: s.to_string(),
            status: "ok".into(),
        })
        .collect();
    output::print_rows(&report, rows, session.format)?;

    if session.format == OutputFormat::Table {
        print_success(&format!(
            "Kernel active, ledger sealed ({})",
            report.certificate.seal_hash.short()
        ));
    }
    Ok(ExitCode::SUCCESS)
}

pub fn status(session: &Session) -> CliResult<ExitCode> {
    let (orch, _) = session.boot()?;
    let status = orch.get_system_status();

    let flags: Vec<String> = status.activated.iter().map(ToString::to_string).collect();
    let rows = vec![
        FieldRow::new("orchestrator", status.orchestrator_id),
        FieldRow::new("state", &status.state),
        FieldRow::new("node", status.node_id),
        FieldRow::new("unbounded resolved", status.unbounded_resolved),
        FieldRow::new("ledger", status.ledger_state),
        FieldRow::new("blocks", status.ledger_blocks),
        FieldRow::new("head", status.head_hash.short()),
        FieldRow::new(
            "seal",
            status.seal_hash.map_or_else(|| "-".to_string(), |h| h.short()),
        ),
        FieldRow::new("capability level", status.capability_level),
        FieldRow::new("capabilities", status.capabilities.len()),
        FieldRow::new("activated", flags.join(", ")),
    ];
    output::print_rows(&status, rows, session.format)?;
    Ok(ExitCode::SUCCESS)
}

pub fn validate(session: &Session) -> CliResult<ExitCode> {
    let mut orch = session.orchestrator()?;
    if let Err(err) = orch.initialize() {
        print_warning(&format!("initialization failed: {err}"));
    }
    let report = orch.validate_system();
    print_report(&report, session.format)?;

    Ok(if report.overall_valid {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn print_report(report: &AuditReport, format: OutputFormat) -> CliResult<()> {
    let rows: Vec<CheckRow> = report.checks.iter().map(CheckRow::from).collect();
    output::print_rows(report, rows, format)?;
    if format == OutputFormat::Table {
        let summary = format!("{}/{} checks passed", report.passed(), report.checks.len());
        if report.overall_valid {
            print_success(&summary);
        } else {
            println!("{} {}", "✗".red(), summary);
        }
    }
    Ok(())
}

pub fn convert(session: &Session, percentage: f64) -> CliResult<ExitCode> {
    let (mut orch, _) = session.boot()?;
    let result = orch.process_constraint(percentage)?;
    let rows = vec![
        FieldRow::new("percentage", result.percentage),
        FieldRow::new("value", result.value),
    ];
    output::print_rows(&result, rows, session.format)?;
    Ok(ExitCode::SUCCESS)
}

pub fn exec(session: &Session, command: &str) -> CliResult<ExitCode> {
    let (mut orch, _) = session.boot()?;
    let receipt = orch.execute_command(command)?;
    let rows = vec![
        FieldRow::new("receipt", receipt.id),
        FieldRow::new("command", &receipt.command),
        FieldRow::new("digest", receipt.digest.short()),
        FieldRow::new("capability level", receipt.capability_level),
        FieldRow::new("ledger", receipt.ledger_state),
    ];
    output::print_rows(&receipt, rows, session.format)?;
    Ok(ExitCode::SUCCESS)
}
