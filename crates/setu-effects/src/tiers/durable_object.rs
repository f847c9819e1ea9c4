//! Durable object tier: an HTTP object store addressed path-style
//!
//! Objects live at `{endpoint}/{bucket}/{caseId}/{millis}_{fileName}`. The
//! locator is the key below the bucket. Case and officer ids travel as
//! `x-amz-meta-*` headers so the object carries its provenance.
//!
//! Sanitized names and same-millisecond ingests can map two files to one key.
//! A store never replaces an existing object. Keys that answer `HEAD` are
//! skipped and the `PUT` itself carries `If-None-Match: *`; a `412`/`409`
//! moves on to the next numbered key (`{key}-1`, `{key}-2`, ..).

use async_trait::async_trait;
use setu_core::{
    config::DurableObjectConfig, EvidenceTier, SecretString, SetuError, StoreRequest, TierError,
    TierKind, TierOperation,
};
use std::time::Duration;
use tracing::debug;

use super::http;
use crate::naming::{numbered_key, object_key, sanitize_component};

const KIND: TierKind = TierKind::DurableObject;

/// Numbered keys tried before a store gives up
const MAX_KEY_ATTEMPTS: u32 = 64;

/// HTTP object-store tier
#[derive(Debug)]
pub struct BucketObjectTier {
    client: reqwest::Client,
    endpoint: String,
    bucket: String,
    access_token: Option<SecretString>,
    timeout: Duration,
}

impl BucketObjectTier {
    /// Build from the `[durable_object]` section; endpoint and bucket are required
    pub fn from_config(config: &DurableObjectConfig) -> Result<Self, SetuError> {
        let endpoint = config
            .endpoint
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| SetuError::config("durable_object requires an endpoint"))?;
        let bucket = config
            .bucket
            .as_deref()
            .map(|b| b.trim().trim_matches('/'))
            .filter(|b| !b.is_empty())
            .ok_or_else(|| SetuError::config("durable_object requires a bucket"))?;

        Ok(Self {
            client: http::client(config.timeout())?,
            endpoint: http::base_url(endpoint),
            bucket: bucket.to_string(),
            access_token: config.access_token.clone().filter(|t| !t.is_blank()),
            timeout: config.timeout(),
        })
    }

    fn object_url(&self, key: &str) -> String {
        format!("{}/{}/{}", self.endpoint, self.bucket, key)
    }

    fn authorized(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.access_token {
            Some(token) => builder.bearer_auth(token.expose()),
            None => builder,
        }
    }

    fn write_error(&self, e: reqwest::Error) -> TierError {
        http::transport_error(KIND, TierOperation::Write, self.timeout, e)
    }

    /// Whether an object already answers at `key`
    async fn exists(&self, key: &str) -> Result<bool, TierError> {
        let response = self
            .authorized(self.client.head(self.object_url(key)))
            .send()
            .await
            .map_err(|e| self.write_error(e))?;
        Ok(response.status().is_success())
    }

    /// `PUT` that only creates; `Ok(false)` when the store already holds `key`
    async fn put_if_absent(&self, key: &str, request: StoreRequest<'_>) -> Result<bool, TierError> {
        let builder = self
            .client
            .put(self.object_url(key))
            .header(reqwest::header::IF_NONE_MATCH, "*")
            .header(reqwest::header::CONTENT_TYPE, request.media_type)
            .header("x-amz-meta-case-id", sanitize_component(request.case_id.as_str()))
            .header(
                "x-amz-meta-officer-id",
                sanitize_component(request.officer_id.as_str()),
            )
            .body(request.bytes.to_vec());

        let response = self
            .authorized(builder)
            .send()
            .await
            .map_err(|e| self.write_error(e))?;

        let status = response.status();
        if status == reqwest::StatusCode::PRECONDITION_FAILED
            || status == reqwest::StatusCode::CONFLICT
        {
            return Ok(false);
        }
        if !status.is_success() {
            return Err(http::status_error(KIND, TierOperation::Write, key, response).await);
        }
        Ok(true)
    }
}

/// Keys we produce are `case/millis_name[-n]`; anything else is refused
fn is_valid_key(key: &str) -> bool {
    !key.is_empty()
        && !key.starts_with('/')
        && key
            .split('/')
            .all(|segment| !segment.is_empty() && segment != "." && segment != "..")
}

#[async_trait]
impl EvidenceTier for BucketObjectTier {
    fn kind(&self) -> TierKind {
        KIND
    }

    async fn store(&self, request: StoreRequest<'_>) -> Result<String, TierError> {
        let base = object_key(request.case_id, request.ingested_at, request.file_name);

        for attempt in 0..MAX_KEY_ATTEMPTS {
            let key = numbered_key(&base, attempt);
            if self.exists(&key).await? {
                debug!(key = %key, "Object key taken, trying next");
                continue;
            }
            if self.put_if_absent(&key, request).await? {
                debug!(key = %key, bucket = %self.bucket, "Stored evidence object");
                return Ok(key);
            }
            debug!(key = %key, "Conditional put lost the key, trying next");
        }

        Err(TierError::write(
            KIND,
            format!("no free object key under {base} after {MAX_KEY_ATTEMPTS} attempts"),
        ))
    }

    async fn fetch(&self, locator: &str) -> Result<Vec<u8>, TierError> {
        if !is_valid_key(locator) {
            return Err(TierError::read(
                KIND,
                format!("{locator:?} is not an object key"),
            ));
        }

        let response = self
            .authorized(self.client.get(self.object_url(locator)))
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
