use anyhow::Result;
use colored::Colorize;
use serde::Serialize;
use std::io::Write;
use std::time::Duration;

use super::{RunRecord, StrategySummary};

#[derive(Serialize)]
struct JsonReport<'a> {
    runs: &'a [RunRecord],
    strategies: &'a [StrategySummary],
}

pub fn generate_console_report(
    out: &mut dyn Write,
    records: &[RunRecord],
    summaries: &[StrategySummary],
    total_duration: Duration,
) -> Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", "📊 Simulation Results".bright_cyan().bold())?;
    writeln!(out, "{}", "=====================".cyan())?;

    let failed = records.iter().filter(|r| !r.passed()).count();
    writeln!(out, "Total runs: {}", records.len())?;
    writeln!(out, "Passed: {}", (records.len() - failed).to_string().green())?;
    writeln!(out, "Failed: {}", failed.to_string().red())?;
    writeln!(out, "Total time: {total_duration:?}")?;
    writeln!(out)?;

    for record in records {
        let status = if record.passed() {
            "✅ PASS".green()
        } else {
            "❌ FAIL".red()
        };
        let winner = record.winner.as_deref().unwrap_or("nobody");
        let finish = if record.natural_win { "won" } else { "led at the cap" };
        writeln!(
            out,
            "{status} [{} seed {}] {} {finish} with {} points",
            record.strategy.bold(),
            record.seed,
            winner.bright_white(),
            record.winner_success.unwrap_or_default()
        )?;
        writeln!(
            out,
            "   {} turns, {} laps, {} routes completed, pot peak ${}",
            record.turns, record.laps, record.routes_completed, record.pot_peak
        )?;
        for violation in &record.violations {
            writeln!(out, "     • {}", violation.red())?;
        }
    }

    if !summaries.is_empty() {
        writeln!(out)?;
        writeln!(out, "{}", "⚖️  Strategy Summary".bright_yellow().bold())?;
        writeln!(out, "{}", "===================".yellow())?;
        for summary in summaries {
            writeln!(
                out,
                "{:10} runs {:3}  win rate {:5.1}%  avg turns {:6.1}  avg laps {:4.1}",
                summary.strategy,
                summary.runs,
                summary.natural_win_rate * 100.0,
                summary.average_turns,
                summary.average_laps
            )?;
        }
    }
    Ok(())
}

pub fn generate_json_report(
    out: &mut dyn Write,
    records: &[RunRecord],
    summaries: &[StrategySummary],
) -> Result<()> {
    let report = JsonReport {
        runs: records,
        strategies: summaries,
    };
    serde_json::to_writer_pretty(&mut *out, &report)?;
    writeln!(out)?;
    Ok(())
}

pub fn generate_markdown_report(
    out: &mut dyn Write,
    records: &[RunRecord],
    summaries: &[StrategySummary],
) -> Result<()> {
    writeln!(out, "# Exito Simulation Report\n")?;

    writeln!(out, "## Strategies\n")?;
    writeln!(out, "| Strategy | Runs | Win rate | Avg turns | Avg laps | Failed |")?;
    writeln!(out, "|---|---:|---:|---:|---:|---:|")?;
    for summary in summaries {
        writeln!(
            out,
            "| {} | {} | {:.1}% | {:.1} | {:.1} | {} |",
            summary.strategy,
            summary.runs,
            summary.natural_win_rate * 100.0,
            summary.average_turns,
            summary.average_laps,
            summary.failed_runs
        )?;
    }

    writeln!(out, "\n## Runs\n")?;
    for record in records {
        let status = if record.passed() { "✅" } else { "❌" };
        writeln!(out, "### {status} {} seed {}\n", record.strategy, record.seed)?;
        writeln!(
            out,
            "- **Winner**: {} ({} points{})",
            record.winner.as_deref().unwrap_or("nobody"),
            record.winner_success.unwrap_or_default(),
            if record.natural_win { "" } else { ", action cap" }
        )?;
        writeln!(out, "- **Turns**: {}", record.turns)?;
        writeln!(out, "- **Laps**: {}", record.laps)?;
        writeln!(out, "- **Routes completed**: {}", record.routes_completed)?;
        writeln!(out, "- **Pot peak**: ${}", record.pot_peak)?;
        if !record.violations.is_empty() {
            writeln!(out, "- **Violations**:")?;
            for violation in &record.violations {
                writeln!(out, "  - {violation}")?;
            }
        }
        writeln!(out)?;
    }
    Ok(())
}
