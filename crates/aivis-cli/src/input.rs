//! Loading the company profile and prompt list from disk.

use std::path::Path;

use aivis_core::{CompanyProfile, RawPrompt};
use anyhow::Context;

pub const DEFAULT_INTENT: &str = "Unbiased Discovery";

pub fn load_profile(path: &Path) -> anyhow::Result<CompanyProfile> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading profile {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing profile {}", path.display()))
}

pub fn load_prompts(path: &Path) -> anyhow::Result<Vec<RawPrompt>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading prompts {}", path.display()))?;
    let prompts = parse_prompts(&text);
    anyhow::ensure!(!prompts.is_empty(), "no prompts in {}", path.display());
    Ok(prompts)
}

/// One prompt per line. A tab splits an optional intent category from the text.
pub fn parse_prompts(text: &str) -> Vec<RawPrompt> {
    text.lines()
        .filter_map(|line| {
            let (category, prompt) = match line.split_once('\t') {
                Some((c, p)) if !c.trim().is_empty() => (c.trim(), p.trim()),
                Some((_, p)) => (DEFAULT_INTENT, p.trim()),
                None => (DEFAULT_INTENT, line.trim()),
            };
            (!prompt.is_empty()).then(|| RawPrompt::new(prompt, category))
        })
        .collect()
}
