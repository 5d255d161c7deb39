//! Prompt construction for eval drafting and code extraction
//!
//! The prompt text is content, not logic: the system prompts live in
//! the markdown files next to this module and are compiled in as a
//! versioned [`PromptSet`]. Builders here only pair that text with the
//! caller's input.

use log::trace;
use serde::Serialize;

use crate::request::{Message, Role};

/// Version of the bundled prompt text. Bump on any wording change.
pub const PROMPT_SET_VERSION: &str = "2025-08-eval-author-v1";

/// Versioned table of prompt text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PromptSet
{   pub version: &'static str
  , pub draft_eval_system: &'static str
  , pub draft_eval_user_prefix: &'static str
  , pub extract_code_system: &'static str
}

/// The canonical prompt set shipped with this crate
pub const PROMPTS: PromptSet = PromptSet
{   version: PROMPT_SET_VERSION
  , draft_eval_system: include_str!("draft_eval_system.md")
  , draft_eval_user_prefix:
      "Given the following evaluation task, outline the approach \
       and, if asked, produce code snippets.\nTASK: "
  , extract_code_system: include_str!("extract_code_system.md")
};

/// Ordered `[system, user]` message pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PromptPair
{   messages: [Message; 2]
}

impl PromptPair
{   fn new(system: &str, user: String) -> Self
    {   PromptPair
        {   messages: [
              Message::new(Role::System, system)
            , Message::new(Role::User, user)
            ]
        }
    }

    pub fn system(&self) -> &Message
    {   &self.messages[0]
    }

    pub fn user(&self) -> &Message
    {   &self.messages[1]
    }

    pub fn messages(&self) -> &[Message]
    {   &self.messages
    }

    pub fn into_messages(self) -> Vec<Message>
    {   self.messages.into()
    }
}

/// Build the eval-drafting prompt for `task`.
///
/// `task` is interpolated verbatim after the fixed prefix; nothing is
/// escaped or trimmed, so the result must be treated as plain text.
pub fn build_draft_eval_prompt(task: &str) -> PromptPair
{   trace!("Building draft-eval prompt ({} bytes of task)", task.len());
    let mut user = String::with_capacity(
      PROMPTS.draft_eval_user_prefix.len() + task.len()
    );
    user.push_str(PROMPTS.draft_eval_user_prefix);
    user.push_str(task);
    PromptPair::new(PROMPTS.draft_eval_system, user)
}

/// Build the code-extraction prompt; the user message is `text` verbatim
pub fn build_extract_code_prompt(text: &str) -> PromptPair
{   trace!("Building extract-code prompt ({} bytes)", text.len());
    PromptPair::new(PROMPTS.extract_code_system, text.to_string())
}

#[cfg(test)]
mod tests
{   use super::*;

    fn content(message: &Message) -> &str
    {   message.content.as_deref().unwrap_or_default()
    }

    #[test]
    fn test_draft_prompt_shape()
    {   let pair = build_draft_eval_prompt("evaluate code generation quality");
        assert_eq!(pair.messages().len(), 2);
        assert_eq!(pair.system().role, Role::System);
        assert_eq!(pair.user().role, Role::User);
        assert_eq!(
          content(pair.user()),
          "Given the following evaluation task, outline the approach and, \
           if asked, produce code snippets.\nTASK: evaluate code generation quality"
        );
    }

    #[test]
    fn test_draft_prompt_is_deterministic()
    {   let task = "write an eval for hallucination detection";
        assert_eq!(
          build_draft_eval_prompt(task),
          build_draft_eval_prompt(task)
        );
    }

    #[test]
    fn test_draft_prompt_interpolates_verbatim()
    {   for task in ["", "line one\nline two\n", "TASK: nested TASK:", "{task} %s \\n"]
        {   let pair = build_draft_eval_prompt(task);
            let user = content(pair.user());
            assert!(user.starts_with(PROMPTS.draft_eval_user_prefix));
            assert_eq!(&user[PROMPTS.draft_eval_user_prefix.len()..], task);
        }
    }

    #[test]
    fn test_draft_system_prompt_describes_framework()
    {   let pair = build_draft_eval_prompt("x");
        let system = content(pair.system());
        assert!(system.contains("@evaluation_test"));
        assert!(system.contains("passed_threshold"));
        assert!(system.contains("SingleTurnRolloutProcessor"));
        assert!(system.contains("AgentRolloutProcessor"));
        assert!(system.contains("dataset_adapter"));
        assert!(system.contains("```python"));
    }

    #[test]
    fn test_extract_prompt_user_is_verbatim()
    {   let text = "Here is the code:\n```python\nprint('Hello, world!')\n```\n";
        let pair = build_extract_code_prompt(text);
        assert_eq!(content(pair.user()), text);
        assert_eq!(pair.system().role, Role::System);
    }

    #[test]
    fn test_extract_prompt_states_last_block_rule()
    {   let system = PROMPTS.extract_code_system;
        assert!(system.contains("LAST fenced block"));
        assert!(system.contains("no fence"));
        assert!(system.contains("Here is the code:"));
        assert!(system.contains("print('final')"));
    }

    #[test]
    fn test_into_messages_keeps_order()
    {   let messages = build_extract_code_prompt("x").into_messages();
        assert_eq!(messages[0].role, Role::System);
        assert_eq!(messages[1].role, Role::User);
    }

    #[test]
    fn test_prompt_set_is_versioned()
    {   assert_eq!(PROMPTS.version, PROMPT_SET_VERSION);
        assert!(!PROMPTS.draft_eval_system.trim().is_empty());
        assert!(!PROMPTS.extract_code_system.trim().is_empty());
    }
}
