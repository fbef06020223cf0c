use std::io::Write;
use std::path::PathBuf;

use aivis_gateway::{GatewayConfig, http_gateways};
use aivis_orchestrator::AuditSession;
use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod display;
mod input;

#[derive(Parser, Debug)]
#[command(name = "aivis", version, about = "Multi-provider AI visibility audit")]
struct Cli {
    /// Evaluation backend base URL
    #[arg(long, env = "AIVIS_API_URL", default_value = "http://localhost:8000", global = true)]
    api_url: String,

    /// Per-request timeout in seconds
    #[arg(long, env = "AIVIS_TIMEOUT_SECS", default_value_t = 120, global = true)]
    timeout_secs: u64,

    /// Backend model behind the standard provider
    #[arg(
        long,
        env = "AIVIS_STANDARD_PROVIDER",
        default_value = "gemini",
        value_parser = ["gemini", "cerebras"],
        global = true
    )]
    standard_provider: String,

    /// Backend model behind the alternate provider
    #[arg(long, env = "AIVIS_ALTERNATE_PROVIDER", default_value = "openrouter", global = true)]
    alternate_provider: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a full three-provider audit over a prompt file
    Audit {
        /// Company profile JSON
        #[arg(long)]
        profile: PathBuf,
        /// One prompt per line, optionally `category<TAB>text`
        #[arg(long)]
        prompts: PathBuf,
        /// Print the composite report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Evaluate a single prompt on every provider
    Evaluate {
        /// Company profile JSON
        #[arg(long)]
        profile: PathBuf,
        /// Prompt text
        #[arg(long)]
        prompt: String,
    },
}

impl Cli {
    fn gateway_config(&self) -> GatewayConfig {
        let mut config = GatewayConfig {
            base_url: self.api_url.clone(),
            timeout_secs: self.timeout_secs,
            ..GatewayConfig::default()
        }
        .with_standard_provider(&self.standard_provider);
        config.alternate.provider = self.alternate_provider.clone();
        config
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    tracing::info!("aivis v{}", env!("CARGO_PKG_VERSION"));

    let cli = Cli::parse();
    let gateways = http_gateways(&cli.gateway_config()).context("building provider gateways")?;
    let session = AuditSession::new(gateways);
    let mut stdout = std::io::stdout().lock();

    match cli.command {
        Command::Audit {
            profile,
            prompts,
            json,
        } => {
            let profile = input::load_profile(&profile)?;
            let raw = input::load_prompts(&prompts)?;
            let prompts = session.ingest_generated(raw);
            let outcome = session.run_audit(&profile).await;

            for failure in &outcome.failures {
                tracing::warn!(provider = %failure.provider, "{failure}");
            }

            match session.composite() {
                Some(report) if json => {
                    serde_json::to_writer_pretty(&mut stdout, report.as_ref())?;
                    writeln!(stdout)?;
                }
                Some(report) => {
                    display::write_composite(&mut stdout, &report)?;
                    display::write_rank_table(&mut stdout, &prompts, |id, kind| {
                        session.rank_label(id, kind)
                    })?;
                }
                None => display::write_no_report(&mut stdout, &outcome.failures)?,
            }
        }
        Command::Evaluate { profile, prompt } => {
            let profile = input::load_profile(&profile)?;
            let prompt = session
                .add_manual(&prompt)
                .context("prompt text is empty")?;
            let outcomes = session.rerun_all_providers(&prompt.id, &profile).await;
            display::write_prompt_outcomes(&mut stdout, &prompt, &outcomes)?;
            if outcomes.iter().all(|(_, r)| r.is_err()) {
                tracing::warn!(prompt_id = %prompt.id, "no provider evaluated the prompt");
            }
        }
    }

    Ok(())
}
