pub mod aggregate;
pub mod evaluation;
pub mod profile;
pub mod prompt;
pub mod provider;
pub mod report;
pub mod scoring;

pub use aggregate::{BatchSet, aggregate};
pub use evaluation::{CompetitorRank, Evaluation, EvaluationResult, Sentiment, Source, rank_label};
pub use profile::CompanyProfile;
pub use prompt::{IdentityAssigner, Prompt, PromptId, RawPrompt, SourceTag};
pub use provider::{ProviderKind, UnknownProvider};
pub use report::{BatchReport, CompetitorInsight, CompositeReport};
