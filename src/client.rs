//! The seam between this crate and whatever produces completions

use std::future::Future;
use std::sync::Arc;

use crate::error::Error;
use crate::extract::CompletionResult;
use crate::request::CompletionRequest;

/// Anything that can turn a chat request into a raw completion result.
///
/// The returned result may be any [`CompletionResult`] shape; callers
/// normalise it with [`crate::extract::extract`].
pub trait CompletionProvider: Send + Sync
{   fn complete(&self, request: CompletionRequest)
      -> impl Future<Output = Result<CompletionResult, Error>> + Send;
}

impl<P: CompletionProvider> CompletionProvider for &P
{   fn complete(&self, request: CompletionRequest)
      -> impl Future<Output = Result<CompletionResult, Error>> + Send
    {   (**self).complete(request)
    }
}

impl<P: CompletionProvider> CompletionProvider for Arc<P>
{   fn complete(&self, request: CompletionRequest)
      -> impl Future<Output = Result<CompletionResult, Error>> + Send
    {   (**self).complete(request)
    }
}
