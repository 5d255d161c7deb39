//! Thin wrappers sequencing prompt construction, a completion call and
//! content extraction

use log::{debug, error, info};

use crate::client::CompletionProvider;
use crate::config::CompletionSettings;
use crate::error::Error;
use crate::extract::extract;
use crate::prompts::{build_draft_eval_prompt, build_extract_code_prompt, PromptPair};
use crate::request::CompletionRequest;

fn to_request(settings: &CompletionSettings, pair: PromptPair)
  -> CompletionRequest
{   CompletionRequest::new(settings.model.clone(), pair.into_messages())
      .with_temperature(settings.temperature)
      .with_max_tokens(settings.max_tokens)
}

async fn run<P>(
  provider: &P
, settings: &CompletionSettings
, pair: PromptPair
) -> Result<String, Error>
where
  P: CompletionProvider
{   let request = to_request(settings, pair);
    let result = provider.complete(request).await?;
    extract(&result).map_err(|e| {
      error!("Provider returned an unusable result: {}", e);
      e
    })
}

/// Ask the model to draft an eval for `task`; returns the assistant text
pub async fn draft_eval<P>(
  provider: &P
, settings: &CompletionSettings
, task: &str
) -> Result<String, Error>
where
  P: CompletionProvider
{   info!("Drafting eval with {}", settings.model);
    let draft = run(provider, settings, build_draft_eval_prompt(task)).await?;
    debug!("Draft is {} bytes", draft.len());
    Ok(draft)
}

/// Ask the model to isolate the code in `text`
pub async fn extract_code<P>(
  provider: &P
, settings: &CompletionSettings
, text: &str
) -> Result<String, Error>
where
  P: CompletionProvider
{   info!("Extracting code with {}", settings.model);
    let code = run(provider, settings, build_extract_code_prompt(text)).await?;
    debug!("Extracted {} bytes of code", code.len());
    Ok(code)
}

/// Draft an eval, then reduce the draft to its final code block
pub async fn draft_eval_code<P>(
  provider: &P
, draft_settings: &CompletionSettings
, extract_settings: &CompletionSettings
, task: &str
) -> Result<String, Error>
where
  P: CompletionProvider
{   let draft = draft_eval(provider, draft_settings, task).await?;
    extract_code(provider, extract_settings, &draft).await
}

#[cfg(test)]
mod tests
{   use super::*;
    use std::sync::Mutex;
    use serde_json::json;
    use crate::extract::CompletionResult;
    use crate::prompts::PROMPTS;
    use crate::request::{ChatCompletion, Role};

    /// Provider answering every request through `respond`
    struct StubProvider<F>
    {   respond: F
      , seen: Mutex<Vec<CompletionRequest>>
    }

    impl<F> StubProvider<F>
    where
      F: Fn(&CompletionRequest) -> Result<CompletionResult, Error> + Send + Sync
    {   fn new(respond: F) -> Self
        {   StubProvider
            {   respond
              , seen: Mutex::new(Vec::new())
            }
        }

        fn requests(&self) -> Vec<CompletionRequest>
        {   self.seen.lock().unwrap().clone()
        }
    }

    impl<F> CompletionProvider for StubProvider<F>
    where
      F: Fn(&CompletionRequest) -> Result<CompletionResult, Error> + Send + Sync
    {   async fn complete(&self, request: CompletionRequest)
          -> Result<CompletionResult, Error>
        {   let result = (self.respond)(&request);
            self.seen.lock().unwrap().push(request);
            result
        }
    }

    fn content(request: &CompletionRequest, role: Role) -> String
    {   request.messages
          .iter()
          .find(|m| m.role == role)
          .and_then(|m| m.content.clone())
          .unwrap_or_default()
    }

    /// A model that follows the extraction instructions: last fenced
    /// block wins, unfenced text is returned trimmed.
    fn code_model(request: &CompletionRequest)
      -> Result<CompletionResult, Error>
    {   assert!(content(request, Role::System).contains("LAST fenced block"));
        let text = content(request, Role::User);
        let mut blocks = Vec::new();
        let mut current: Option<Vec<&str>> = None;
        for line in text.lines()
        {   if line.trim_start().starts_with("```")
            {   match current.take()
                {   Some(lines) => blocks.push(lines.join("\n"))
                  , None => current = Some(Vec::new())
                }
            } else if let Some(lines) = current.as_mut()
            {   lines.push(line);
            }
        }
        let code = blocks.pop().unwrap_or_else(|| text.trim().to_string());
        Ok(CompletionResult::Mapping(json!({
          "choices": [{"message": {"role": "assistant", "content": code}}]
        })))
    }

    fn init_logger()
    {   let _ = env_logger::builder().is_test(true).try_init();
    }

    fn settings() -> CompletionSettings
    {   CompletionSettings::new("stub-model")
    }

    #[tokio::test]
    async fn test_extract_code_round_trip()
    {   init_logger();
        let provider = StubProvider::new(code_model);
        let text = "Here is the code:\n```python\nprint('Hello, world!')\n```\n";

        let code = extract_code(&provider, &settings(), text).await.unwrap();
        assert_eq!(code, "print('Hello, world!')");

        let requests = provider.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(content(&requests[0], Role::User), text);
        assert_eq!(requests[0].model, "stub-model");
        assert_eq!(requests[0].temperature, Some(0.0));
    }

    #[tokio::test]
    async fn test_extract_code_prefers_last_block()
    {   let provider = StubProvider::new(code_model);
        let text = "First try:\n```python\nprint('draft')\n```\n\
                    Fixed:\n```python\nprint('final')\n```\n";

        let code = extract_code(&provider, &settings(), text).await.unwrap();
        assert_eq!(code, "print('final')");
    }

    #[tokio::test]
    async fn test_extract_code_bare_code()
    {   let provider = StubProvider::new(code_model);
        let code = extract_code(&provider, &settings(), "print('Hello, world!')")
          .await
          .unwrap();
        assert_eq!(code, "print('Hello, world!')");
    }

    #[tokio::test]
    async fn test_draft_eval_sends_draft_prompt()
    {   let provider = StubProvider::new(|_: &CompletionRequest| {
          Ok(CompletionResult::from(ChatCompletion::with_content("an outline")))
        });

        let draft = draft_eval(&provider, &settings(), "validate JSON schema")
          .await
          .unwrap();
        assert_eq!(draft, "an outline");

        let requests = provider.requests();
        let request = &requests[0];
        assert_eq!(content(request, Role::System), PROMPTS.draft_eval_system);
        assert!(content(request, Role::User).ends_with("TASK: validate JSON schema"));
    }

    #[tokio::test]
    async fn test_extraction_failure_is_surfaced()
    {   let provider = StubProvider::new(|_: &CompletionRequest| {
          Ok(CompletionResult::Mapping(json!({"choices": []})))
        });
        let result = draft_eval(&provider, &settings(), "task").await;
        assert!(matches!(result, Err(Error::ExtractionFailed(_))));
    }

    #[tokio::test]
    async fn test_provider_error_is_surfaced()
    {   let provider = StubProvider::new(|_: &CompletionRequest| {
          Err(Error::Api("503 Service Unavailable".to_string()))
        });
        let result = extract_code(&provider, &settings(), "x").await;
        assert_eq!(result, Err(Error::Api("503 Service Unavailable".to_string())));
    }

    #[tokio::test]
    async fn test_draft_eval_code_chains_both_prompts()
    {   let provider = StubProvider::new(|request: &CompletionRequest| {
          if content(request, Role::System) == PROMPTS.draft_eval_system
          {   Ok(CompletionResult::from(
                "Approach: check keys.\n```python\nassert 'ok' in text\n```\n"
              ))
          } else
          {   code_model(request)
          }
        });

        let code = draft_eval_code(&provider, &settings(), &settings(), "ok key eval")
          .await
          .unwrap();
        assert_eq!(code, "assert 'ok' in text");
        assert_eq!(provider.requests().len(), 2);
    }

    #[test]
    fn test_blocking_entry_point()
    {   let provider = StubProvider::new(|_: &CompletionRequest| {
          Ok(CompletionResult::from("done"))
        });
        let out = tokio_test::block_on(draft_eval(&provider, &settings(), "t"));
        assert_eq!(out.unwrap(), "done");
    }
}
