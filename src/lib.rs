pub mod error;
pub mod config;
pub mod request;
pub mod prompts;
pub mod extract;
pub mod client;
pub mod providers;
pub mod drafter;
pub mod evaluation;

/*

evaldraft drafts evals (scored rubrics for LLM output) by prompting a
chat model with a fixed system prompt plus a task, and pulls the
assistant text (and optionally just the code) back out of whatever
the provider returned.

evaldraft/
├── Cargo.toml
├── src/
│   ├── lib.rs          # Re-exports
│   ├── main.rs         # `evaldraft draft` / `evaldraft extract-code`
│   ├── error.rs        # Error enum
│   ├── config.rs       # Provider + sampling configuration, env lookup
│   ├── request.rs      # Message / request / typed response
│   ├── prompts/        # Versioned prompt text and builders
│   ├── extract.rs      # CompletionResult -> assistant text
│   ├── client.rs       # CompletionProvider trait
│   ├── providers/      # OpenAI-compatible HTTP client actor
│   ├── drafter.rs      # prompt -> provider -> extract sequencing
│   └── evaluation.rs   # EvaluationRow + dataset adapters
└── tests/

*/

pub use error::Error;
pub use config::{CompletionSettings, DrafterConfig, ProviderConfig, ProviderKind};
pub use request::{ChatCompletion, CompletionRequest, Message, Role};
pub use prompts::{
  build_draft_eval_prompt, build_extract_code_prompt, PromptPair, PromptSet, PROMPTS,
};
pub use extract::{extract, CompletionObject, CompletionResult};
pub use client::CompletionProvider;
pub use providers::ChatClient;
pub use drafter::{draft_eval, draft_eval_code, extract_code};
pub use evaluation::{EvaluateResult, EvaluationRow, MetricResult};
