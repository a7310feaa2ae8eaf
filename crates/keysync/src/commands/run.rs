//! `keysync run` -- one reconciliation pass.

use std::fmt::Write;

use owo_colors::OwoColorize;
use tabled::Tabled;

use keysync_core::{Action, ItemOutcome, RunOptions, SyncReport};

use crate::cli::{GlobalOpts, RunArgs};
use crate::error::CliError;
use crate::output::{self, Printer};

use super::Engine;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct OutcomeRow {
    #[tabled(rename = "Action")]
    action: String,
    #[tabled(rename = "Booking")]
    booking: String,
    #[tabled(rename = "Lock")]
    lock: String,
    #[tabled(rename = "Code")]
    code: String,
    #[tabled(rename = "Detail")]
    detail: String,
}

impl From<&ItemOutcome> for OutcomeRow {
    fn from(o: &ItemOutcome) -> Self {
        Self {
            action: o.action.to_string(),
            booking: output::cell(o.booking_id.as_ref()),
            lock: output::cell(o.lock_id),
            code: output::cell(o.code_id),
            detail: o.detail.clone(),
        }
    }
}

// ── Rendering ───────────────────────────────────────────────────────

fn summary_line(report: &SyncReport) -> String {
    format!(
        "{prefix}created {} · updated {} · unchanged {} · deleted {} · skipped {} · errors {}",
        report.created,
        report.updated,
        report.unchanged,
        report.deleted,
        report.skipped,
        report.errors,
        prefix = if report.dry_run { "[dry run] " } else { "" },
    )
}

fn render_report(report: &SyncReport, color: bool) -> String {
    let mut out = String::new();
    let changed: Vec<OutcomeRow> = report
        .items
        .iter()
        .filter(|o| o.action != Action::Unchanged)
        .map(OutcomeRow::from)
        .collect();
    if !changed.is_empty() {
        let _ = writeln!(out, "{}", output::table(changed));
    }

    let summary = summary_line(report);
    match (color, report.is_success()) {
        (false, _) => out.push_str(&summary),
        (true, true) => {
            let _ = write!(out, "{}", summary.green());
        }
        (true, false) => {
            let _ = write!(out, "{}", summary.red());
        }
    }
    if report.notifications_failed > 0 {
        let _ = write!(
            out,
            "\n{} notification(s) could not be delivered",
            report.notifications_failed
        );
    }
    out
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(sync: &Engine, args: RunArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let options = RunOptions {
        dry_run: args.dry_run,
        today: super::today(),
    };
    let report = sync.run(options).await?;

    let printer = Printer::new(global);
    let color = printer.color();
    printer.value(&report, |r| render_report(r, color), summary_line);

    if report.is_success() {
        Ok(())
    } else {
        Err(CliError::ItemsFailed {
            failed: report.errors,
        })
    }
}
