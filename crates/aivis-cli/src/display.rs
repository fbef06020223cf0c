//! Text rendering of audit results.
//!
//! The composite report prints as a card grouped into sections, followed by a
//! prompt × provider grid of recommendation ranks.

use std::io::{self, Write};

use aivis_core::{CompositeReport, EvaluationResult, Prompt, PromptId, ProviderKind, rank_label};
use aivis_orchestrator::DispatchError;

const MAX_PROMPT_WIDTH: usize = 48;
const RANK_WIDTH: usize = 12;

// ── Composite report ──

pub fn write_composite(out: &mut impl Write, report: &CompositeReport) -> io::Result<()> {
    writeln!(out, "=== AI Visibility Score: {:.1} ===", report.overall_score)?;
    let providers: Vec<&str> = report.providers.iter().map(|p| p.as_str()).collect();
    if report.is_composite {
        writeln!(
            out,
            "Composite of {} providers ({})",
            report.provider_count,
            providers.join(", ")
        )?;
    } else {
        writeln!(out, "Single provider ({})", providers.join(", "))?;
    }
    writeln!(out)?;

    writeln!(out, "Report")?;
    writeln!(out, "  {:<26} {}", "base_provider", report.source_batch)?;
    writeln!(out, "  {:<26} {}", "provider_count", report.provider_count)?;
    writeln!(out)?;

    write_list(out, "Key Findings", &report.key_findings)?;
    write_list(out, "Optimizer Tips", &report.optimizer_tips)?;
    write_list(out, "Competitors", &report.competitor_summary)?;
    Ok(())
}

pub fn write_no_report(out: &mut impl Write, failures: &[DispatchError]) -> io::Result<()> {
    writeln!(out, "No report: no provider returned a usable result.")?;
    for failure in failures {
        writeln!(out, "  {:<26} {}", failure.provider, failure)?;
    }
    Ok(())
}

fn write_list(out: &mut impl Write, header: &str, items: &[String]) -> io::Result<()> {
    if items.is_empty() {
        return Ok(());
    }
    writeln!(out, "{header}")?;
    for item in items {
        writeln!(out, "  - {item}")?;
    }
    writeln!(out)
}

// ── Rank grid ──

pub fn write_rank_table(
    out: &mut impl Write,
    prompts: &[Prompt],
    label: impl Fn(&PromptId, ProviderKind) -> String,
) -> io::Result<()> {
    if prompts.is_empty() {
        return Ok(());
    }
    write!(out, "{:<w$}", "Prompt", w = MAX_PROMPT_WIDTH)?;
    for kind in ProviderKind::ALL {
        write!(out, " {:>w$}", kind.as_str(), w = RANK_WIDTH)?;
    }
    writeln!(out)?;

    for prompt in prompts {
        write!(out, "{:<w$}", truncate(&prompt.text, MAX_PROMPT_WIDTH), w = MAX_PROMPT_WIDTH)?;
        for kind in ProviderKind::ALL {
            write!(out, " {:>w$}", label(&prompt.id, kind), w = RANK_WIDTH)?;
        }
        writeln!(out)?;
    }
    Ok(())
}

// ── Single prompt ──

pub fn write_prompt_outcomes(
    out: &mut impl Write,
    prompt: &Prompt,
    outcomes: &[(ProviderKind, Result<EvaluationResult, DispatchError>)],
) -> io::Result<()> {
    writeln!(out, "=== {} ===", prompt.text)?;
    writeln!(out)?;
    for (kind, outcome) in outcomes {
        writeln!(out, "{kind}")?;
        match outcome {
            Ok(result) => {
                let eval = &result.evaluation;
                writeln!(out, "  {:<26} {}", "rank", rank_label(Some(result)))?;
                writeln!(
                    out,
                    "  {:<26} {}",
                    "brand_present",
                    if eval.brand_present { "yes" } else { "no" }
                )?;
                writeln!(out, "  {:<26} {:.0}%", "accuracy", eval.accuracy_score * 100.0)?;
                if let Some(model) = &result.model_name {
                    writeln!(out, "  {:<26} {}", "model", model)?;
                }
                if !eval.competitor_ranks.is_empty() {
                    let names: Vec<&str> =
                        eval.competitor_ranks.iter().map(|c| c.name.as_str()).collect();
                    writeln!(out, "  {:<26} {}", "competitors", names.join(", "))?;
                }
            }
            Err(err) => writeln!(out, "  {:<26} {}", "error", err)?,
        }
        writeln!(out)?;
    }
    Ok(())
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let kept: String = text.chars().take(width.saturating_sub(3)).collect();
    format!("{kept}...")
}
