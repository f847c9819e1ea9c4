//! Content-addressed network tier backed by a pinning service
//!
//! Uploads go to `{api_url}/pinning/pinFileToIPFS` as multipart form data and
//! return a content identifier (CID). Reads go through a public gateway at
//! `{gateway_url}/ipfs/{cid}`.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use setu_core::{
    config::ContentNetworkConfig, EvidenceTier, SecretString, SetuError, StoreRequest, TierError,
    TierKind, TierOperation,
};
use std::time::Duration;
use tracing::debug;

use super::http;

const KIND: TierKind = TierKind::ContentNetwork;
const FALLBACK_MEDIA_TYPE: &str = "application/octet-stream";

#[derive(Serialize)]
struct PinMetadata<'a> {
    name: &'a str,
    keyvalues: PinKeyValues<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PinKeyValues<'a> {
    case_id: &'a str,
    officer_id: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PinOptions {
    cid_version: u8,
}

#[derive(Deserialize)]
struct PinResponse {
    #[serde(rename = "IpfsHash")]
    ipfs_hash: String,
}

/// Pinning-service tier
#[derive(Debug)]
pub struct PinningGatewayTier {
    client: reqwest::Client,
    api_url: String,
    gateway_url: String,
    api_key: SecretString,
    api_secret: SecretString,
    cid_version: u8,
    timeout: Duration,
}

impl PinningGatewayTier {
    /// Build from the `[content_network]` section; credentials are required
    pub fn from_config(config: &ContentNetworkConfig) -> Result<Self, SetuError> {
        let (Some(api_key), Some(api_secret)) = (&config.api_key, &config.api_secret) else {
            return Err(SetuError::config(
                "content_network requires api_key and api_secret",
            ));
        };
        Ok(Self {
            client: http::client(config.timeout())?,
            api_url: http::base_url(&config.api_url),
            gateway_url: http::base_url(&config.gateway_url),
            api_key: api_key.clone(),
            api_secret: api_secret.clone(),
            cid_version: config.cid_version,
            timeout: config.timeout(),
        })
    }

    fn pin_url(&self) -> String {
        format!("{}/pinning/pinFileToIPFS", self.api_url)
    }

    fn gateway_url_for(&self, cid: &str) -> String {
        format!("{}/ipfs/{}", self.gateway_url, cid)
    }

    fn form(&self, request: &StoreRequest<'_>) -> Result<Form, TierError> {
        let media_type = if request.media_type.contains('/') {
            request.media_type
        } else {
            FALLBACK_MEDIA_TYPE
        };
        let part = Part::bytes(request.bytes.to_vec())
            .file_name(request.file_name.to_string())
            .mime_str(media_type)
            .map_err(|e| TierError::write(KIND, format!("Invalid media type: {e}")))?;

        let metadata = serde_json::to_string(&PinMetadata {
            name: request.file_name,
            keyvalues: PinKeyValues {
                case_id: request.case_id.as_str(),
                officer_id: request.officer_id.as_str(),
            },
        })
        .map_err(|e| TierError::write(KIND, e.to_string()))?;
        let options = serde_json::to_string(&PinOptions {
            cid_version: self.cid_version,
        })
        .map_err(|e| TierError::write(KIND, e.to_string()))?;

        Ok(Form::new()
            .part("file", part)
            .text("pinataMetadata", metadata)
            .text("pinataOptions", options))
    }
}

/// CIDs are base32 or base58 strings
fn is_plausible_cid(locator: &str) -> bool {
    !locator.is_empty() && locator.chars().all(|c| c.is_ascii_alphanumeric())
}

#[async_trait]
impl EvidenceTier for PinningGatewayTier {
    fn kind(&self) -> TierKind {
        KIND
    }

    async fn store(&self, request: StoreRequest<'_>) -> Result<String, TierError> {
        let form = self.form(&request)?;
        let response = self
            .client
            .post(self.pin_url())
            .header("pinata_api_key", self.api_key.expose())
            .header("pinata_secret_api_key", self.api_secret.expose())
            .multipart(form)
            .send()
            .await
            .map_err(|e| http::transport_error(KIND, TierOperation::Write, self.timeout, e))?;

        if !response.status().is_success() {
            return Err(
                http::status_error(KIND, TierOperation::Write, request.file_name, response).await,
            );
        }

        let pinned: PinResponse = response
            .json()
            .await
            .map_err(|e| TierError::write(KIND, format!("Unexpected pinning response: {e}")))?;
        if !is_plausible_cid(&pinned.ipfs_hash) {
            return Err(TierError::write(
                KIND,
                format!("Pinning service returned unusable CID {:?}", pinned.ipfs_hash),
            ));
        }

        debug!(cid = %pinned.ipfs_hash, file = request.file_name, "Pinned evidence");
        Ok(pinned.ipfs_hash)
    }

    async fn fetch(&self, locator: &str) -> Result<Vec<u8>, TierError> {
        if !is_plausible_cid(locator) {
            return Err(TierError::read(
                KIND,
                format!("{locator:?} is not a content identifier"),
            ));
        }

        let response = self
            .client
            .get(self.gateway_url_for(locator))
            .send()
            .await
            .map_err(|e| http::transport_error(KIND, TierOperation::Read, self.timeout, e))?;

        if !response.status().is_success() {
            return Err(http::status_error(KIND, TierOperation::Read, locator, response).await);
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| http::transport_error(KIND, TierOperation::Read, self.timeout, e))?;
        Ok(bytes.to_vec())
    }
}
