use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use sha1::{Digest, Sha1};
use tracing::{debug, warn};

use crate::domain::media::{MediaError, MediaStore, UploadedImage};

pub const CLOUDINARY_API_URL: &str = "https://api.cloudinary.com/v1_1";

/// Hosts whose URLs belong to Cloudinary deliveries.
const CLOUDINARY_HOST_SUFFIX: &str = "cloudinary.com";

#[derive(Clone)]
pub struct CloudinaryConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
    pub api_url: String,
}

impl std::fmt::Debug for CloudinaryConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudinaryConfig")
            .field("cloud_name", &self.cloud_name)
            .field("api_key", &self.api_key)
            .field("api_secret", &"[REDACTED]")
            .field("api_url", &self.api_url)
            .finish()
    }
}

/// [`MediaStore`] backed by the Cloudinary upload API using signed requests.
pub struct CloudinaryMediaStore {
    config: CloudinaryConfig,
    http: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
    public_id: String,
}

#[derive(Debug, Deserialize)]
struct DestroyResponse {
    result: String,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

impl CloudinaryMediaStore {
    pub fn new(config: CloudinaryConfig, http: reqwest::Client) -> Self {
        Self { config, http }
    }

    fn endpoint(&self, action: &str) -> String {
        format!(
            "{}/{}/image/{action}",
            self.config.api_url.trim_end_matches('/'),
            self.config.cloud_name
        )
    }

    /// Builds the signed form for `params`; the caller adds `file` separately since
    /// it is not part of the signature.
    fn signed_form(&self, params: &[(&str, String)]) -> Vec<(String, String)> {
        let timestamp = Utc::now().timestamp().to_string();

        let mut signed: Vec<(String, String)> = params
            .iter()
            .map(|(k, v)| ((*k).to_string(), v.clone()))
            .collect();
        signed.push(("timestamp".to_string(), timestamp));

        let signature = api_signature(&signed, &self.config.api_secret);
        signed.push(("api_key".to_string(), self.config.api_key.clone()));
        signed.push(("signature".to_string(), signature));
        signed
    }

    async fn post_form(
        &self,
        action: &str,
        form: &[(String, String)],
    ) -> Result<reqwest::Response, MediaError> {
        let response = self
            .http
            .post(self.endpoint(action))
            .form(form)
            .send()
            .await
            .map_err(|err| MediaError::Request(err.to_string()))?;

        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status().as_u16();
        let bytes = response.bytes().await.unwrap_or_default();
        let message = serde_json::from_slice::<ErrorEnvelope>(&bytes).map_or_else(
            |_| String::from_utf8_lossy(&bytes).into_owned(),
            |envelope| envelope.error.message,
        );
        Err(MediaError::Rejected { status, message })
    }
}

#[async_trait]
impl MediaStore for CloudinaryMediaStore {
    async fn upload(&self, payload: &str, folder: &str) -> Result<UploadedImage, MediaError> {
        let mut form = self.signed_form(&[("folder", folder.to_string())]);
        form.push(("file".to_string(), payload.to_string()));

        let response = self.post_form("upload", &form).await?;
        let body: UploadResponse = response
            .json()
            .await
            .map_err(|err| MediaError::InvalidResponse(err.to_string()))?;

        debug!(public_id = %body.public_id, "image uploaded");
        Ok(UploadedImage {
            url: body.secure_url,
            public_id: body.public_id,
        })
    }

    async fn destroy(&self, public_id: &str) -> Result<(), MediaError> {
        let form = self.signed_form(&[("public_id", public_id.to_string())]);

        let response = self.post_form("destroy", &form).await?;
        let body: DestroyResponse = response
            .json()
            .await
            .map_err(|err| MediaError::InvalidResponse(err.to_string()))?;

        match body.result.as_str() {
            "ok" => Ok(()),
            "not found" => {
                warn!(%public_id, "image already absent from media store");
                Ok(())
            }
            other => Err(MediaError::InvalidResponse(format!(
                "destroy returned {other:?}"
            ))),
        }
    }

    fn is_hosted(&self, image_url: &str) -> bool {
        url::Url::parse(image_url)
            .ok()
            .and_then(|url| url.host_str().map(str::to_ascii_lowercase))
            .is_some_and(|host| {
                host == CLOUDINARY_HOST_SUFFIX || host.ends_with(&format!(".{CLOUDINARY_HOST_SUFFIX}"))
            })
    }
}

/// Cloudinary request signature: SHA-1 over the `key=value` pairs sorted by key and
/// joined with `&`, followed by the API secret.
fn api_signature(params: &[(String, String)], api_secret: &str) -> String {
    let mut sorted: Vec<&(String, String)> = params.iter().filter(|(_, v)| !v.is_empty()).collect();
    sorted.sort_by(|a, b| a.0.cmp(&b.0));

    let to_sign = sorted
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");

    let mut hasher = Sha1::new();
    hasher.update(to_sign.as_bytes());
    hasher.update(api_secret.as_bytes());

    hex::encode(hasher.finalize())
}
