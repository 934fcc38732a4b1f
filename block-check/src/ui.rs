//! Terminal output formatting for run summaries.

use block_check_lib::{CheckTarget, RunReport};
use console::Style;

/// Print the outcome of a completed run to stderr.
///
/// stdout is reserved for result records (the default stdout sink), so all
/// human-facing summary output goes to stderr.
pub fn print_run_summary(report: &RunReport) {
    eprintln!("{}", format_run_summary(report));
}

/// Print the targets a dry run would check.
pub fn print_dry_run(targets: &[CheckTarget]) {
    for target in targets {
        match &target.source {
            Some(source) => println!("{},{}", target.domain, source),
            None => println!("{}", target.domain),
        }
    }
    eprintln!("{} domains would be checked", targets.len());
}

fn format_run_summary(report: &RunReport) -> String {
    let heading = Style::new().yellow().bold();
    let good = Style::new().green().bold();
    let bad = Style::new().red().bold();
    let count = Style::new().cyan();

    let mut lines = vec![format!("{}", heading.apply_to("Run complete"))];

    lines.push(format!(
        "  checked   {} of {} targets",
        count.apply_to(report.results_collected),
        count.apply_to(report.targets_total),
    ));

    let failed = report.targets_total.saturating_sub(report.results_collected);
    if failed > 0 {
        lines.push(format!(
            "  failed    {} (skipped, see log)",
            count.apply_to(failed)
        ));
    }

    lines.push(format!("  blocked   {}", count.apply_to(report.blocked_count)));

    let upload = if report.persisted {
        format!("{}", good.apply_to("upload succeeded"))
    } else {
        format!("{}", bad.apply_to("upload FAILED"))
    };
    lines.push(format!("  {}", upload));

    lines.join("\n")
}
