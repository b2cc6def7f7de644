use anyhow::Result;
use chrono::{DateTime, Utc};
use colored::Colorize;
use protocol_game::Outcome;
use std::collections::BTreeMap;
use std::io::Write;
use std::time::Duration;

use super::tester::{PlaythroughRecord, summarize_decision_path};

const OUTCOMES: [Outcome; 4] = [
    Outcome::Flawless,
    Outcome::Ghost,
    Outcome::Standard,
    Outcome::Improvised,
];

/// Per-strategy rollup used by the console and markdown reports
#[derive(Debug, Clone, PartialEq)]
pub struct StrategySummary {
    pub strategy: String,
    pub runs: usize,
    pub passed: usize,
    pub mean_retries: f64,
    pub outcomes: BTreeMap<String, usize>,
}

#[must_use]
pub fn summarize_by_strategy(records: &[PlaythroughRecord]) -> Vec<StrategySummary> {
    let mut grouped: BTreeMap<&str, Vec<&PlaythroughRecord>> = BTreeMap::new();
    for record in records {
        grouped
            .entry(record.strategy.label())
            .or_default()
            .push(record);
    }

    grouped
        .into_iter()
        .map(|(strategy, runs)| {
            let mut outcomes = BTreeMap::new();
            for outcome in runs.iter().filter_map(|r| r.outcome) {
                *outcomes.entry(outcome.to_string()).or_insert(0) += 1;
            }
            let total_retries: u32 = runs.iter().map(|r| r.retries).sum();
            #[allow(clippy::cast_precision_loss)]
            let mean_retries = f64::from(total_retries) / runs.len() as f64;
            StrategySummary {
                strategy: strategy.to_string(),
                runs: runs.len(),
                passed: runs.iter().filter(|r| r.passed()).count(),
                mean_retries,
                outcomes,
            }
        })
        .collect()
}

fn success_rate(records: &[PlaythroughRecord]) -> f64 {
    if records.is_empty() {
        return 0.0;
    }
    let passed = records.iter().filter(|r| r.passed()).count();
    #[allow(clippy::cast_precision_loss)]
    let rate = (passed as f64 / records.len() as f64) * 100.0;
    rate
}

pub fn generate_console_report(
    out: &mut dyn Write,
    records: &[PlaythroughRecord],
    total_duration: Duration,
) -> Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", "📊 Playthrough Results Summary".bright_cyan().bold())?;
    writeln!(out, "{}", "==============================".cyan())?;

    let total = records.len();
    let passed = records.iter().filter(|r| r.passed()).count();
    writeln!(out, "Total runs: {total}")?;
    writeln!(out, "Passed: {}", passed.to_string().green())?;
    writeln!(out, "Failed: {}", (total - passed).to_string().red())?;
    writeln!(out, "Success rate: {:.1}%", success_rate(records))?;
    writeln!(out, "Total time: {total_duration:?}")?;
    writeln!(out)?;

    for record in records {
        let status = if record.passed() {
            "✅ PASS".green()
        } else {
            "❌ FAIL".red()
        };
        writeln!(
            out,
            "{status} {} / {} / seed {}",
            record.strategy.label().bold(),
            record.loadout,
            record.seed
        )?;
        let outcome = record
            .outcome
            .map_or_else(|| "none".to_string(), |o| o.headline().to_string());
        writeln!(out, "   Outcome: {outcome}")?;
        writeln!(
            out,
            "   Final stats: hp {} stealth {} style {} focus {}",
            record.final_stats.hp,
            record.final_stats.stealth,
            record.final_stats.style,
            record.final_stats.focus
        )?;
        writeln!(
            out,
            "   Missions: {} | Retries: {} | Items: {}",
            record.missions_cleared, record.retries, record.inventory_size
        )?;
        if !record.failures.is_empty() {
            writeln!(out, "   Failures:")?;
            for failure in &record.failures {
                writeln!(out, "     • {}", failure.red())?;
            }
            writeln!(out, "   Last decisions: {}", summarize_decision_path(record))?;
        }
        writeln!(out)?;
    }

    let summaries = summarize_by_strategy(records);
    if !summaries.is_empty() {
        writeln!(out, "{}", "🎂 Outcome Distribution".bright_yellow().bold())?;
        writeln!(out, "{}", "=======================".yellow())?;
        for summary in &summaries {
            let spread = OUTCOMES
                .iter()
                .map(|o| {
                    let key = o.to_string();
                    format!("{key} {}", summary.outcomes.get(&key).copied().unwrap_or(0))
                })
                .collect::<Vec<_>>()
                .join(", ");
            writeln!(
                out,
                "{}: {}/{} passed, mean retries {:.2} ({spread})",
                summary.strategy.bold(),
                summary.passed,
                summary.runs,
                summary.mean_retries
            )?;
        }
    }
    Ok(())
}

pub fn generate_json_report(out: &mut dyn Write, records: &[PlaythroughRecord]) -> Result<()> {
    let json_output = serde_json::to_string_pretty(records)?;
    writeln!(out, "{json_output}")?;
    Ok(())
}

pub fn generate_markdown_report(
    out: &mut dyn Write,
    records: &[PlaythroughRecord],
    generated_at: DateTime<Utc>,
) -> Result<()> {
    writeln!(out, "# Birthday Protocol Playthrough Results\n")?;
    writeln!(
        out,
        "_Generated {}_\n",
        generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    )?;

    let total = records.len();
    let passed = records.iter().filter(|r| r.passed()).count();
    writeln!(out, "## Summary\n")?;
    writeln!(out, "- **Total runs**: {total}")?;
    writeln!(out, "- **Passed**: {passed}")?;
    writeln!(out, "- **Failed**: {}", total - passed)?;
    writeln!(out, "- **Success rate**: {:.1}%\n", success_rate(records))?;

    writeln!(out, "## Strategies\n")?;
    writeln!(
        out,
        "| Strategy | Runs | Passed | Mean retries | Flawless | Ghost | Standard | Improvised |"
    )?;
    writeln!(out, "|---|---|---|---|---|---|---|---|")?;
    for summary in summarize_by_strategy(records) {
        let count = |o: Outcome| summary.outcomes.get(&o.to_string()).copied().unwrap_or(0);
        writeln!(
            out,
            "| {} | {} | {} | {:.2} | {} | {} | {} | {} |",
            summary.strategy,
            summary.runs,
            summary.passed,
            summary.mean_retries,
            count(Outcome::Flawless),
            count(Outcome::Ghost),
            count(Outcome::Standard),
            count(Outcome::Improvised)
        )?;
    }
    writeln!(out)?;

    writeln!(out, "## Detailed Results\n")?;
    for record in records {
        let status = if record.passed() { "✅" } else { "❌" };
        writeln!(
            out,
            "### {status} {} / {} / seed {}\n",
            record.strategy.label(),
            record.loadout,
            record.seed
        )?;
        if let Some(outcome) = record.outcome {
            writeln!(out, "- **Outcome**: {}", outcome.headline())?;
        }
        writeln!(
            out,
            "- **Final stats**: hp {} / stealth {} / style {} / focus {}",
            record.final_stats.hp,
            record.final_stats.stealth,
            record.final_stats.style,
            record.final_stats.focus
        )?;
        writeln!(out, "- **Retries**: {}", record.retries)?;
        writeln!(out, "- **Briefings**: {}", record.provider)?;
        if !record.failures.is_empty() {
            writeln!(out, "- **Failures**:")?;
            for failure in &record.failures {
                writeln!(out, "  - {failure}")?;
            }
        }
        writeln!(out)?;
    }
    Ok(())
}
