use std::fmt;

/// Custom error type for evaldraft operations
/// Implements Clone so replies can cross actor channels
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error
{   /// No known completion shape yielded assistant content
    ExtractionFailed(String)
  , /// API key is missing for a provider
    MissingApiKey(String)
  , /// HTTP transport error
    Http(String)
  , /// Provider returned a non-success response
    Api(String)
  , /// Failed to decode a provider response body
    Parse(String)
  , /// Invalid configuration
    InvalidConfiguration(String)
  , /// Malformed dataset file or record
    Dataset(String)
  , /// Timeout error
    Timeout
  , /// Generic error
    Other(String)
}

impl fmt::Display for Error
{   fn fmt(&self, f: &mut fmt::Formatter<'_>)
      -> fmt::Result
    {   match self
        {   Error::ExtractionFailed(msg) => {
              write!(f,
                "Unable to extract assistant content: {}",
                msg
              )
            }
          , Error::MissingApiKey(provider) => {
              write!(f, "Missing API key for: {}", provider)
            }
          , Error::Http(msg) => {
              write!(f, "HTTP error: {}", msg)
            }
          , Error::Api(msg) => {
              write!(f, "API error: {}", msg)
            }
          , Error::Parse(msg) => {
              write!(f, "Parse error: {}", msg)
            }
          , Error::InvalidConfiguration(msg) => {
              write!(f, "Invalid configuration: {}", msg)
            }
          , Error::Dataset(msg) => {
              write!(f, "Dataset error: {}", msg)
            }
          , Error::Timeout => {
              write!(f, "Request timed out")
            }
          , Error::Other(msg) => {
              write!(f, "Error: {}", msg)
            }
        }
    }
}

impl std::error::Error for Error {}

impl From<String> for Error
{   fn from(s: String) -> Self
    {   Error::Other(s)
    }
}

impl From<&str> for Error
{   fn from(s: &str) -> Self
    {   Error::Other(s.to_string())
    }
}
