//! API key authentication.
//!
//! The expected key is read once at startup and handed to the servers; request handling never
//! touches the environment.

use std::sync::Arc;

/// Metadata/header name carrying the API key.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Expected API key, shared by every request handler.
#[derive(Clone)]
pub struct ApiKey(Arc<str>);

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

impl ApiKey {
    /// Returns `None` for an empty key so a blank `API_KEY` cannot authenticate anything.
    pub fn new(key: impl AsRef<str>) -> Option<Self> {
        let key = key.as_ref().trim();
        if key.is_empty() {
            None
        } else {
            Some(Self(Arc::from(key)))
        }
    }

    /// Read `API_KEY` from the environment.
    pub fn from_env() -> Option<Self> {
        std::env::var("API_KEY").ok().and_then(Self::new)
    }

    /// Validates the provided API key against the expected one.
    #[allow(clippy::result_large_err)]
    pub fn validate(&self, provided_key: &str) -> Result<(), tonic::Status> {
        if provided_key == &*self.0 {
            Ok(())
        } else {
            Err(tonic::Status::unauthenticated("Invalid API key"))
        }
    }

    /// Validates the `x-api-key` entry of gRPC request metadata.
    #[allow(clippy::result_large_err)]
    pub fn validate_metadata(
        &self,
        metadata: &tonic::metadata::MetadataMap,
    ) -> Result<(), tonic::Status> {
        let provided = metadata
            .get(API_KEY_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| tonic::Status::unauthenticated("Missing x-api-key header"))?;
        self.validate(provided)
    }
}
