//! Provider selection and completion settings
//!
//! Nothing in the prompt or extraction code reads the environment;
//! callers resolve a [`DrafterConfig`] here and pass it down.

use std::path::Path;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::error::Error;

pub const DEFAULT_EXTRACT_MODEL: &str
  = "fireworks_ai/accounts/fireworks/models/gpt-oss-120b";
pub const DEFAULT_DRAFT_MODEL: &str
  = "fireworks_ai/accounts/fireworks/models/qwen3-coder-480b-a35b-instruct";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";

pub const FIREWORKS_API_BASE: &str
  = "https://api.fireworks.ai/inference/v1";
pub const OPENAI_API_BASE: &str = "https://api.openai.com/v1";

/// Routing prefixes carried by LiteLLM-style model names
const FIREWORKS_PREFIX: &str = "fireworks_ai/";
const OPENAI_PREFIX: &str = "openai/";

/// Which OpenAI-compatible endpoint to talk to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind
{   Fireworks
  , OpenAi
  , /// Any other OpenAI-compatible server (vLLM, Ollama, ...)
    Custom
}

/// Provider endpoint configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderConfig
{   pub kind: ProviderKind
  , /// API base URL, without the `/chat/completions` suffix
    pub api_base: String
  , /// API key; never serialized back out
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>
  , /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64
}

fn default_timeout_secs() -> u64
{   120
}

impl ProviderConfig
{   pub fn fireworks(api_key: Option<String>) -> Self
    {   ProviderConfig
        {   kind: ProviderKind::Fireworks
          , api_base: FIREWORKS_API_BASE.to_string()
          , api_key
          , timeout_secs: default_timeout_secs()
        }
    }

    pub fn openai(api_key: Option<String>) -> Self
    {   ProviderConfig
        {   kind: ProviderKind::OpenAi
          , api_base: OPENAI_API_BASE.to_string()
          , api_key
          , timeout_secs: default_timeout_secs()
        }
    }

    /// Model name as the endpoint expects it
    pub fn wire_model<'a>(&self, model: &'a str) -> &'a str
    {   match self.kind
        {   ProviderKind::Fireworks => model
              .strip_prefix(FIREWORKS_PREFIX)
              .unwrap_or(model)
          , ProviderKind::OpenAi => model
              .strip_prefix(OPENAI_PREFIX)
              .unwrap_or(model)
          , ProviderKind::Custom => model
        }
    }
}

/// Per-call sampling settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionSettings
{   pub model: String
  , #[serde(default)]
    pub temperature: Option<f32>
  , #[serde(default)]
    pub max_tokens: Option<usize>
}

impl CompletionSettings
{   pub fn new(model: impl Into<String>) -> Self
    {   CompletionSettings
        {   model: model.into()
          , temperature: Some(0.0)
          , max_tokens: None
        }
    }
}

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrafterConfig
{   pub provider: ProviderConfig
  , /// Settings used when drafting evals
    pub draft: CompletionSettings
  , /// Settings used when extracting code
    pub extract: CompletionSettings
}

impl Default for DrafterConfig
{   fn default() -> Self
    {   DrafterConfig
        {   provider: ProviderConfig::fireworks(None)
          , draft: CompletionSettings::new(DEFAULT_DRAFT_MODEL)
          , extract: CompletionSettings::new(DEFAULT_EXTRACT_MODEL)
        }
    }
}

impl DrafterConfig
{   /// Resolve configuration from the process environment
    pub fn from_env() -> Result<Self, Error>
    {   Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve configuration from an arbitrary variable lookup.
    ///
    /// `LITELLM_MODEL` overrides both models and picks the endpoint
    /// from its routing prefix. Otherwise an `OPENAI_API_KEY` without a
    /// `FIREWORKS_API_KEY` selects OpenAI with `OPENAI_MODEL`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, Error>
    where
      F: Fn(&str) -> Option<String>
    {   let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = DrafterConfig::default();

        if let Some(model) = var("LITELLM_MODEL")
        {   debug!("Using LITELLM_MODEL: {}", model);
            config.provider = litellm_provider(
              &model
            , var("FIREWORKS_API_KEY")
            , var("OPENAI_API_KEY")
            );
            debug!("Routed {} to {:?}", model, config.provider.kind);
            config.draft.model = model.clone();
            config.extract.model = model;
            let temperature = parse_temperature(
              "LITELLM_TEMPERATURE", var("LITELLM_TEMPERATURE")
            )?;
            config.draft.temperature = temperature;
            config.extract.temperature = temperature;
        } else if let (None, Some(key))
          = (var("FIREWORKS_API_KEY"), var("OPENAI_API_KEY"))
        {   let model = var("OPENAI_MODEL")
              .unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string());
            debug!("Using OpenAI model: {}", model);
            config.provider = ProviderConfig::openai(Some(key));
            config.draft.model = model.clone();
            config.extract.model = model;
            let temperature = parse_temperature(
              "OPENAI_TEMPERATURE", var("OPENAI_TEMPERATURE")
            )?;
            config.draft.temperature = temperature;
            config.extract.temperature = temperature;
        } else
        {   debug!("Using default Fireworks models");
            config.provider = ProviderConfig::fireworks(var("FIREWORKS_API_KEY"));
        }

        if let Some(base) = var("EVALDRAFT_API_BASE")
        {   debug!("Overriding API base: {}", base);
            config.provider.kind = ProviderKind::Custom;
            config.provider.api_base = base;
        }

        if config.provider.api_key.is_none()
        {   warn!("No API key configured for {:?}", config.provider.kind);
        }
        Ok(config)
    }

    /// Load configuration from a JSON file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, Error>
    {   let path = path.as_ref();
        debug!("Loading config from {}", path.display());
        let raw = std::fs::read_to_string(path).map_err(|e| {
          Error::InvalidConfiguration(
            format!("{}: {}", path.display(), e)
          )
        })?;
        serde_json::from_str(&raw).map_err(|e| {
          Error::InvalidConfiguration(
            format!("{}: {}", path.display(), e)
          )
        })
    }
}

/// Endpoint for a LiteLLM-style model name.
///
/// `fireworks_ai/` goes to Fireworks and `openai/` to OpenAI. A bare
/// name goes to OpenAI only when an OpenAI key is the sole key set.
fn litellm_provider(
  model: &str
, fireworks_key: Option<String>
, openai_key: Option<String>
) -> ProviderConfig
{   if model.starts_with(FIREWORKS_PREFIX)
    {   return ProviderConfig::fireworks(fireworks_key);
    }
    if model.starts_with(OPENAI_PREFIX)
    {   return ProviderConfig::openai(openai_key);
    }
    match (fireworks_key, openai_key)
    {   (None, Some(key)) => ProviderConfig::openai(Some(key))
      , (fireworks_key, _) => ProviderConfig::fireworks(fireworks_key)
    }
}

/// Unset means temperature 0
fn parse_temperature(key: &str, raw: Option<String>)
  -> Result<Option<f32>, Error>
{   match raw
    {   None => Ok(Some(0.0))
      , Some(raw) => raw.trim()
          .parse::<f32>()
          .map(Some)
          .map_err(|_| {
            Error::InvalidConfiguration(
              format!("{} is not a number: {}", key, raw)
            )
          })
    }
}
