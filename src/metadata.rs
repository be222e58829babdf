//! NFT metadata lookup through an IPFS HTTP gateway

use crate::gateway::{ChainGateway, GatewayError};
use alloy::primitives::U256;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

const METADATA_TIMEOUT: Duration = Duration::from_secs(10);
const METADATA_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Error, Debug)]
pub enum MetadataError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Metadata request returned status {0}")]
    Status(u16),

    #[error("Unsupported token URI: {0}")]
    UnsupportedUri(String),

    #[error(transparent)]
    Chain(#[from] GatewayError),
}

impl MetadataError {
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http(e) => e.is_timeout() || e.is_connect(),
            Self::Status(code) => matches!(code, 408 | 429 | 500 | 502 | 503 | 504),
            Self::UnsupportedUri(_) => false,
            Self::Chain(e) => e.is_retryable(),
        }
    }
}

/// ERC-721 metadata JSON; unknown fields are ignored
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NftMetadata {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

/// Rewrite an `ipfs://` URI onto an HTTP gateway.
///
/// `ipfs://CID/path`, `ipfs://ipfs/CID/path` and `/ipfs/CID/path` all map to
/// `{gateway}CID/path`. `http(s)` URIs are returned unchanged; anything else
/// yields `None`.
pub fn resolve_ipfs_uri(uri: &str, gateway: &str) -> Option<String> {
    let uri = uri.trim();
    if uri.starts_with("http://") || uri.starts_with("https://") {
        return Some(uri.to_string());
    }

    let path = uri
        .strip_prefix("ipfs://")
        .map(|rest| rest.strip_prefix("ipfs/").unwrap_or(rest))
        .or_else(|| uri.strip_prefix("/ipfs/"))
        .or_else(|| uri.strip_prefix("ipfs/"))?;
    if path.is_empty() {
        return None;
    }

    let base = gateway.trim_end_matches('/');
    Some(format!("{base}/{path}"))
}

pub struct MetadataClient {
    http: reqwest::Client,
    gateway: String,
}

impl MetadataClient {
    pub fn new(gateway: impl Into<String>) -> Result<Self, MetadataError> {
        let http = reqwest::Client::builder()
            .timeout(METADATA_TIMEOUT)
            .connect_timeout(METADATA_CONNECT_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            gateway: gateway.into(),
        })
    }

    pub fn gateway(&self) -> &str {
        &self.gateway
    }

    /// Fetch and parse the metadata document behind `token_uri`
    pub async fn fetch(&self, token_uri: &str) -> Result<NftMetadata, MetadataError> {
        let url = resolve_ipfs_uri(token_uri, &self.gateway)
            .ok_or_else(|| MetadataError::UnsupportedUri(token_uri.to_string()))?;
        debug!(url = %url, "Fetching token metadata");

        let response = self.http.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(MetadataError::Status(status.as_u16()));
        }
        Ok(response.json::<NftMetadata>().await?)
    }

    /// Look up `tokenURI` on-chain, then fetch the document.
    ///
    /// Failures are logged and reported as `None`; metadata is decoration.
    pub async fn fetch_token(&self, gateway: &dyn ChainGateway, token_id: U256) -> Option<NftMetadata> {
        let result = async {
            let uri = gateway.token_uri(token_id).await?;
            self.fetch(&uri).await
        }
        .await;

        match result {
            Ok(metadata) => Some(metadata),
            Err(e) => {
                warn!(token_id = %token_id, error = %e, retryable = e.is_retryable(), "Metadata unavailable");
                None
            }
        }
    }

    /// Image URL resolved onto the gateway
    pub fn image_url(&self, metadata: &NftMetadata) -> Option<String> {
        resolve_ipfs_uri(metadata.image.as_deref()?, &self.gateway)
    }
}
