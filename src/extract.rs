//! Normalisation of heterogeneous completion results into assistant text
//!
//! Providers hand back the same "assistant said X" payload in several
//! incompatible shapes. [`CompletionResult`] closes that space to three
//! variants and [`extract`] tries them in a fixed order, first match
//! wins. A shape reader that does not recognise its input yields `None`; only
//! when every reader has declined does extraction fail.

use std::fmt;
use log::{debug, error, trace};
use serde_json::Value;

use crate::error::Error;
use crate::request::ChatCompletion;

// ===== Attribute-access view =====

/// Borrowed view of a choice's `message`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageView<'a>
{   pub content: Option<&'a str>
}

/// Borrowed view of `choices[0]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChoiceView<'a>
{   pub message: Option<MessageView<'a>>
  , pub text: Option<&'a str>
}

/// Typed response object exposing `choices[0]` by field access.
///
/// Implement this for SDK response types so they can be handed to
/// [`extract`] without first being flattened to JSON.
pub trait CompletionObject: fmt::Debug + Send + Sync
{   /// `None` when the object has no choices at all
    fn first_choice(&self) -> Option<ChoiceView<'_>>;
}

impl CompletionObject for ChatCompletion
{   fn first_choice(&self) -> Option<ChoiceView<'_>>
    {   self.choices.first().map(|choice| ChoiceView
        {   message: choice.message.as_ref().map(|m| MessageView
            {   content: m.content.as_deref()
            })
          , text: choice.text.as_deref()
        })
    }
}

// ===== Completion result =====

/// Raw result returned by a completion provider
#[derive(Debug)]
pub enum CompletionResult
{   /// Content already extracted by the provider or adapter
    RawText(String)
  , /// JSON-decoded provider response
    Mapping(Value)
  , /// Typed response object
    Object(Box<dyn CompletionObject>)
}

impl CompletionResult
{   /// Short name of the variant, used in logs and errors
    pub fn shape(&self) -> &'static str
    {   match self
        {   CompletionResult::RawText(_) => "raw_text"
          , CompletionResult::Mapping(_) => "mapping"
          , CompletionResult::Object(_) => "object"
        }
    }
}

impl From<String> for CompletionResult
{   fn from(s: String) -> Self
    {   CompletionResult::RawText(s)
    }
}

impl From<&str> for CompletionResult
{   fn from(s: &str) -> Self
    {   CompletionResult::RawText(s.to_string())
    }
}

impl From<Value> for CompletionResult
{   fn from(value: Value) -> Self
    {   match value
        {   Value::String(s) => CompletionResult::RawText(s)
          , other => CompletionResult::Mapping(other)
        }
    }
}

impl From<ChatCompletion> for CompletionResult
{   fn from(completion: ChatCompletion) -> Self
    {   CompletionResult::Object(Box::new(completion))
    }
}

// ===== Shape readers =====

type ShapeReader = fn(&CompletionResult) -> Option<String>;

/// Reader order; earlier, less ambiguous shapes win
const READERS: [(&str, ShapeReader); 3] =
  [ ("raw_text", read_raw_text)
  , ("mapping", read_mapping)
  , ("object", read_object)
  ];

fn read_raw_text(result: &CompletionResult) -> Option<String>
{   match result
    {   CompletionResult::RawText(text) => Some(text.clone())
      , _ => None
    }
}

/// `choices[0].message.content`, then `choices[0].text`, then `""`.
/// Empty content counts as missing.
fn read_mapping(result: &CompletionResult) -> Option<String>
{   let CompletionResult::Mapping(value) = result else
    {   return None;
    };
    let choice = value
      .get("choices")?
      .as_array()?
      .first()?
      .as_object()?;

    let content = choice
      .get("message")
      .and_then(Value::as_object)
      .and_then(|message| message.get("content"))
      .and_then(content_text)
      .filter(|content| !content.is_empty());
    if let Some(content) = content
    {   return Some(content);
    }

    trace!("mapping has no message content, falling back to text");
    Some(
      choice
        .get("text")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
    )
}

/// Message content is either a string or a list of content parts
fn content_text(content: &Value) -> Option<String>
{   match content
    {   Value::String(s) => Some(s.clone())
      , Value::Array(parts) => {
          let texts: Vec<&str> = parts
            .iter()
            .filter(|part| {
              part.get("type")
                .and_then(Value::as_str)
                .map_or(true, |kind| kind == "text")
            })
            .filter_map(|part| part.get("text").and_then(Value::as_str))
            .collect();
          if texts.is_empty()
          {   None
          } else
          {   Some(texts.concat())
          }
        }
      , _ => None
    }
}

/// `choices[0].message.content` when present (even if empty),
/// else `choices[0].text`
fn read_object(result: &CompletionResult) -> Option<String>
{   let CompletionResult::Object(object) = result else
    {   return None;
    };
    let choice = object.first_choice()?;
    if let Some(content) = choice.message.and_then(|m| m.content)
    {   return Some(content.to_string());
    }
    choice.text.map(str::to_string)
}

/// Extract the assistant's text from a completion result.
///
/// Returns [`Error::ExtractionFailed`] when no known shape matches.
pub fn extract(result: &CompletionResult) -> Result<String, Error>
{   trace!("Extracting content from {} result", result.shape());
    for (name, read) in READERS
    {   if let Some(text) = read(result)
        {   debug!(
              "Extracted {} bytes via {} reader",
              text.len(),
              name
            );
            return Ok(text);
        }
        trace!("{} reader did not match", name);
    }

    error!("No completion shape matched {} result", result.shape());
    Err(Error::ExtractionFailed(format!(
      "no known completion shape recognized in {} result",
      result.shape()
    )))
}
