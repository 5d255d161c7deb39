use std::time::Duration;
use serde_json::Value;
use tokio::sync::mpsc;
use log::{debug, trace, error, info};

use crate::config::ProviderConfig;
use crate::error::Error;
use crate::extract::CompletionResult;
use crate::request::CompletionRequest;

pub type CompleteReply = Result<CompletionResult, Error>;

// ===== Chat Client Actor =====

/// Commands for the ChatClient actor
pub enum ChatCommand
{   Complete
    {   request: CompletionRequest
      , reply: mpsc::UnboundedSender<CompleteReply>
    }
  , SetApiKey
    {   key: String
      , reply: mpsc::UnboundedSender<Result<(), Error>>
    }
  , Shutdown
}

/// Chat client state, owned by the actor task
pub struct ChatClientState
{   config: ProviderConfig
  , http_client: reqwest::Client
}

impl ChatClientState
{   pub fn new(config: ProviderConfig) -> Result<Self, Error>
    {   debug!("Creating ChatClientState for {:?}", config.kind);
        let http_client = reqwest::Client::builder()
          .timeout(Duration::from_secs(config.timeout_secs))
          .build()
          .map_err(|e| {
            error!("Failed to build HTTP client: {}", e);
            Error::Http(e.to_string())
          })?;
        Ok(ChatClientState
        {   config
          , http_client
        })
    }

    fn api_key(&self) -> Result<&str, Error>
    {   self.config.api_key.as_deref().ok_or_else(|| {
          error!("No API key for {:?}", self.config.kind);
          Error::MissingApiKey(format!("{:?}", self.config.kind))
        })
    }

    fn endpoint(&self) -> String
    {   format!(
          "{}/chat/completions",
          self.config.api_base.trim_end_matches('/')
        )
    }

    async fn handle_complete(
      &self
    , mut request: CompletionRequest
    ) -> CompleteReply
    {   debug!("Handling complete for: {}", request.model);

        let api_key = self.api_key()?;
        request.model = self.config
          .wire_model(&request.model)
          .to_string();

        trace!("Chat request: {:?}", request);

        let response = self.http_client
          .post(self.endpoint())
          .header("Authorization", format!("Bearer {}", api_key))
          .header("Content-Type", "application/json")
          .json(&request)
          .send()
          .await
          .map_err(|e| {
            error!("HTTP error: {}", e);
            if e.is_timeout()
            {   Error::Timeout
            } else
            {   Error::Http(e.to_string())
            }
          })?;

        let status = response.status();
        trace!("Chat response status: {}", status);

        if !status.is_success()
        {   let error_text = response.text().await
              .unwrap_or_else(|_|
                "Unknown error".to_string()
              );
            error!("Provider API error: {}", error_text);
            return Err(Error::Api(
              format!("{}: {}", status, error_text)
            ));
        }

        let body: Value = response.json().await.map_err(|e| {
          error!("Parse error: {}", e);
          Error::Parse(e.to_string())
        })?;

        Ok(CompletionResult::Mapping(body))
    }

    fn handle_set_api_key(&mut self, key: String)
      -> Result<(), Error>
    {   debug!("Setting API key for {:?}", self.config.kind);
        self.config.api_key = Some(key);
        Ok(())
    }
}

/// OpenAI-compatible chat completion client.
///
/// Requests go through a single `run_chat_loop` task that handles one
/// command at a time, so concurrent `complete` calls on the same client
/// are sent sequentially, each waiting for the previous HTTP round trip.
/// Spawn one client per concurrent stream when parallel requests matter.
pub struct ChatClient
{   tx: mpsc::UnboundedSender<ChatCommand>
  , task: tokio::task::JoinHandle<()>
}

impl ChatClient
{   /// Create and spawn a new chat client.
    /// Must be called from within a tokio runtime.
    pub fn new(config: ProviderConfig) -> Result<Self, Error>
    {   debug!("Creating ChatClient for {}", config.api_base);
        let state = ChatClientState::new(config)?;
        let (cmd_tx, cmd_rx)
          = mpsc::unbounded_channel();

        let task = tokio::spawn(async move {
          run_chat_loop(cmd_rx, state).await;
        });

        Ok(ChatClient
        {   tx: cmd_tx
          , task
        })
    }

    /// Send a completion request and wait for the raw result
    pub async fn complete(
      &self
    , request: CompletionRequest
    ) -> CompleteReply
    {   debug!("complete queued for model: {}", request.model);
        let (reply_tx, mut reply_rx)
          = mpsc::unbounded_channel();

        self.tx.send(ChatCommand::Complete {
          request,
          reply: reply_tx,
        }).map_err(|_| disconnected())?;

        reply_rx.recv().await.unwrap_or_else(|| Err(disconnected()))
    }

    /// Replace the API key used for subsequent requests
    pub async fn set_api_key(&self, key: String)
      -> Result<(), Error>
    {   debug!("set_api_key queued");
        let (reply_tx, mut reply_rx)
          = mpsc::unbounded_channel();

        self.tx.send(ChatCommand::SetApiKey {
          key,
          reply: reply_tx,
        }).map_err(|_| disconnected())?;

        reply_rx.recv().await.unwrap_or_else(|| Err(disconnected()))
    }

    /// Shutdown the client
    pub async fn shutdown(self)
      -> Result<(), Error>
    {   debug!("Shutting down ChatClient");
        self.tx.send(ChatCommand::Shutdown)
          .map_err(|_| {
            Error::Other(
              "Client already shutdown".to_string()
            )
          })?;
        self.task.await.map_err(|e| Error::Other(e.to_string()))
    }
}

impl crate::client::CompletionProvider for ChatClient
{   async fn complete(&self, request: CompletionRequest)
      -> CompleteReply
    {   ChatClient::complete(self, request).await
    }
}

fn disconnected() -> Error
{   error!("Chat client disconnected");
    Error::Other("Chat client disconnected".to_string())
}

/// Main chat client event loop
async fn run_chat_loop(
  mut cmd_rx: mpsc::UnboundedReceiver<ChatCommand>
, mut state: ChatClientState
)
{   debug!("Starting chat client loop");

    loop
    { match cmd_rx.recv().await
      {   Some(ChatCommand::Complete { request, reply }) => {
            debug!("Processing Complete");
            let result = state.handle_complete(request).await;
            let _ = reply.send(result);
          }
        , Some(ChatCommand::SetApiKey { key, reply }) => {
            debug!("Processing SetApiKey");
            let result = state.handle_set_api_key(key);
            let _ = reply.send(result);
          }
        , Some(ChatCommand::Shutdown) => {
            info!("Chat client shutting down");
            break;
          }
        , None => {
            debug!("Command channel closed");
            break;
          }
      }
    }
}
