//! Evaluation records and dataset adapters
//!
//! These mirror the record shape an eval runner consumes: an ordered
//! message list, an optional ground truth and, once scored, a result.
//! Running rollouts and applying thresholds is left to the runner.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::prompts::{build_draft_eval_prompt, build_extract_code_prompt};
use crate::request::{Message, Role};

/// Score for one named aspect of a response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricResult
{   pub score: f64
  , pub reason: String
  , pub is_score_valid: bool
}

/// Overall verdict for one record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluateResult
{   pub score: f64
  , pub reason: String
  , #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metrics: BTreeMap<String, MetricResult>
}

impl EvaluateResult
{   pub fn new(score: f64, reason: impl Into<String>) -> Self
    {   EvaluateResult
        {   score
          , reason: reason.into()
          , metrics: BTreeMap::new()
        }
    }

    pub fn with_metric(
      mut self
    , name: impl Into<String>
    , metric: MetricResult
    ) -> Self
    {   self.metrics.insert(name.into(), metric);
        self
    }
}

/// One evaluation case
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationRow
{   pub messages: Vec<Message>
  , #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ground_truth: Option<String>
  , #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evaluation_result: Option<EvaluateResult>
}

impl EvaluationRow
{   pub fn new(messages: Vec<Message>) -> Self
    {   EvaluationRow
        {   messages
          , ground_truth: None
          , evaluation_result: None
        }
    }

    pub fn with_ground_truth(mut self, ground_truth: Option<String>)
      -> Self
    {   self.ground_truth = ground_truth;
        self
    }

    /// Content of the final message, `""` when absent
    pub fn last_content(&self) -> &str
    {   self.messages
          .last()
          .and_then(|m| m.content.as_deref())
          .unwrap_or_default()
    }

    /// Whether any message in the trajectory came from a tool
    pub fn has_tool_message(&self) -> bool
    {   self.messages.iter().any(|m| m.role == Role::Tool)
    }
}

// ===== Dataset records =====

/// `{"task": ...}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRecord
{   pub task: String
}

/// `{"text": ..., "ground_truth": ...}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeRecord
{   pub text: String
  , pub ground_truth: String
}

/// `{"messages": [...], "ground_truth": ...}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessagesRecord
{   pub messages: Vec<Message>
  , #[serde(default)]
    pub ground_truth: Option<String>
}

/// One row per task, each carrying the eval-drafting prompt
pub fn draft_eval_rows(records: &[TaskRecord]) -> Vec<EvaluationRow>
{   debug!("Adapting {} task records", records.len());
    records
      .iter()
      .map(|r| EvaluationRow::new(
        build_draft_eval_prompt(&r.task).into_messages()
      ))
      .collect()
}

/// One row per text, carrying the extraction prompt and expected code
pub fn extract_code_rows(records: &[CodeRecord]) -> Vec<EvaluationRow>
{   debug!("Adapting {} code records", records.len());
    records
      .iter()
      .map(|r| {
        EvaluationRow::new(
          build_extract_code_prompt(&r.text).into_messages()
        ).with_ground_truth(Some(r.ground_truth.clone()))
      })
      .collect()
}

/// Rows from records that already hold their messages
pub fn message_rows(records: &[MessagesRecord]) -> Vec<EvaluationRow>
{   records
      .iter()
      .map(|r| {
        EvaluationRow::new(r.messages.clone())
          .with_ground_truth(r.ground_truth.clone())
      })
      .collect()
}

/// Read a JSON-lines file; blank lines are skipped
pub fn read_jsonl<T>(path: impl AsRef<Path>) -> Result<Vec<T>, Error>
where
  T: DeserializeOwned
{   let path = path.as_ref();
    debug!("Reading dataset {}", path.display());
    let file = File::open(path).map_err(|e| {
      Error::Dataset(format!("{}: {}", path.display(), e))
    })?;

    let mut records = Vec::new();
    for (index, line) in BufReader::new(file).lines().enumerate()
    {   let line = line.map_err(|e| {
          Error::Dataset(format!("{}: {}", path.display(), e))
        })?;
        if line.trim().is_empty()
        {   continue;
        }
        let record = serde_json::from_str(&line).map_err(|e| {
          warn!("Bad record at {}:{}", path.display(), index + 1);
          Error::Dataset(format!(
            "{} line {}: {}",
            path.display(),
            index + 1,
            e
          ))
        })?;
        records.push(record);
    }
    debug!("Read {} records", records.len());
    Ok(records)
}
