//! Chat-completion request and response types shared by providers

use serde::{Deserialize, Serialize};

/// Author of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role
{   System
  , User
  , Assistant
  , Tool
}

/// A single role-tagged chat message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message
{   pub role: Role
  , #[serde(default)]
    pub content: Option<String>
}

impl Message
{   pub fn new(role: Role, content: impl Into<String>) -> Self
    {   Message
        {   role
          , content: Some(content.into())
        }
    }

    pub fn system(content: impl Into<String>) -> Self
    {   Message::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self
    {   Message::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self
    {   Message::new(Role::Assistant, content)
    }
}

/// OpenAI-compatible chat completion request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionRequest
{   /// Model identifier as understood by the provider
    pub model: String
  , /// Ordered conversation sent to the model
    pub messages: Vec<Message>
  , #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>
  , #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<usize>
}

impl CompletionRequest
{   pub fn new(model: impl Into<String>, messages: Vec<Message>)
      -> Self
    {   CompletionRequest
        {   model: model.into()
          , messages
          , temperature: None
          , max_tokens: None
        }
    }

    pub fn with_temperature(mut self, temperature: Option<f32>)
      -> Self
    {   self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: Option<usize>)
      -> Self
    {   self.max_tokens = max_tokens;
        self
    }
}

// ===== Typed response =====

/// Typed chat completion response, as returned by SDK-style clients
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatCompletion
{   #[serde(default)]
    pub choices: Vec<Choice>
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Choice
{   #[serde(default)]
    pub message: Option<ChoiceMessage>
  , /// Legacy completion-style text
    #[serde(default)]
    pub text: Option<String>
  , #[serde(default)]
    pub finish_reason: Option<String>
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChoiceMessage
{   #[serde(default)]
    pub role: Option<Role>
  , #[serde(default)]
    pub content: Option<String>
}

impl ChatCompletion
{   /// Single-choice response carrying assistant content
    pub fn with_content(content: impl Into<String>) -> Self
    {   ChatCompletion
        {   choices: vec![
              Choice
              {   message: Some(ChoiceMessage
                  {   role: Some(Role::Assistant)
                    , content: Some(content.into())
                  })
                , text: None
                , finish_reason: Some("stop".to_string())
              }
            ]
        }
    }

    /// Single-choice response carrying only legacy text
    pub fn with_text(text: impl Into<String>) -> Self
    {   ChatCompletion
        {   choices: vec![
              Choice
              {   message: None
                , text: Some(text.into())
                , finish_reason: Some("stop".to_string())
              }
            ]
        }
    }
}
