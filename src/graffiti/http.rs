use crate::graffiti::collaborators::{
    AssetRecord, AssetRegistry, CredentialIssuer, DownloadBaseResolver, IdentityProvider,
    ObjectStore, StoredObject, UploadCredential,
};
use crate::graffiti::pipeline::{Collaborators, DownloadBase};
use crate::graffiti::settings::{GraffitiSettings, HttpEndpoints};
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

const USER_AGENT: &str = "graffiti-pad";

/// Talks to the site backend and the object storage over HTTP.
pub struct HttpBackend {
    client: Client,
    endpoints: HttpEndpoints,
}

#[derive(Debug, Deserialize)]
struct DownloadBaseResponse {
    url: String,
}

#[derive(Debug, Serialize)]
struct CredentialRequest<'a> {
    key: &'a str,
}

#[derive(Debug, Deserialize)]
struct CredentialResponse {
    token: String,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    key: String,
}

#[derive(Debug, Serialize)]
struct RegisterRequest<'a> {
    kind: &'a str,
    url: &'a str,
    size: u64,
    mime_type: &'a str,
}

impl HttpBackend {
    pub fn new(endpoints: HttpEndpoints, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .context("build graffiti http client")?;
        Ok(Self { client, endpoints })
    }

    pub fn from_settings(settings: &GraffitiSettings) -> Result<Self> {
        Self::new(settings.endpoints.clone(), settings.http_timeout())
    }

    pub fn endpoints(&self) -> &HttpEndpoints {
        &self.endpoints
    }
}

/// Wires every network collaborator to one [`HttpBackend`] built from
/// `settings`. A configured `download_base` is used as is; otherwise the
/// backend resolves it on first submit.
pub fn collaborators_from_settings(
    identity: Arc<dyn IdentityProvider>,
    settings: &GraffitiSettings,
) -> Result<Collaborators> {
    if !settings.endpoints.is_configured() {
        bail!("graffiti credential and upload endpoints are not configured");
    }
    let backend = Arc::new(HttpBackend::from_settings(settings)?);
    let download_base = match settings.download_base.as_deref() {
        Some(base) if !base.trim().is_empty() => DownloadBase::Resolved(base.to_string()),
        _ => {
            require_endpoint(&settings.endpoints.download_base_url, "download base")?;
            DownloadBase::Resolver(backend.clone())
        }
    };
    if settings.endpoints.register_url.trim().is_empty() {
        tracing::warn!("asset registry endpoint not configured; registrations will fail");
    }
    Ok(Collaborators {
        identity,
        download_base,
        issuer: backend.clone(),
        store: backend.clone(),
        registry: backend,
    })
}

fn ensure_success(response: Response, what: &str) -> Result<Response> {
    let status = response.status();
    if !status.is_success() {
        bail!("{what} returned status {status}");
    }
    Ok(response)
}

fn require_endpoint<'a>(url: &'a str, what: &str) -> Result<&'a str> {
    if url.trim().is_empty() {
        bail!("{what} endpoint is not configured");
    }
    Ok(url)
}

#[async_trait]
impl DownloadBaseResolver for HttpBackend {
    async fn resolve_download_base(&self) -> Result<String> {
        let url = require_endpoint(&self.endpoints.download_base_url, "download base")?;
        let response = self
            .client
            .get(url)
            .send()
            .await
            .context("request download base")?;
        let body: DownloadBaseResponse = ensure_success(response, "download base")?
            .json()
            .await
            .context("decode download base response")?;
        Ok(body.url)
    }
}

#[async_trait]
impl CredentialIssuer for HttpBackend {
    async fn issue_upload_credential(&self, object_key: &str) -> Result<UploadCredential> {
        let url = require_endpoint(&self.endpoints.credential_url, "credential")?;
        let response = self
            .client
            .post(url)
            .json(&CredentialRequest { key: object_key })
            .send()
            .await
            .context("request upload credential")?;
        let body: CredentialResponse = ensure_success(response, "credential issuer")?
            .json()
            .await
            .context("decode credential response")?;
        Ok(UploadCredential { token: body.token })
    }
}

#[async_trait]
impl ObjectStore for HttpBackend {
    async fn upload(
        &self,
        bytes: Vec<u8>,
        mime_type: &str,
        object_key: &str,
        credential: &UploadCredential,
    ) -> Result<StoredObject> {
        let url = require_endpoint(&self.endpoints.upload_url, "upload")?;
        let file = Part::bytes(bytes)
            .file_name(object_key.to_string())
            .mime_str(mime_type)
            .context("build upload file part")?;
        let form = Form::new()
            .text("token", credential.token.clone())
            .text("key", object_key.to_string())
            .part("file", file);
        let response = self
            .client
            .post(url)
            .multipart(form)
            .send()
            .await
            .context("upload graffiti image")?;
        let body: UploadResponse = ensure_success(response, "object storage")?
            .json()
            .await
            .context("decode upload response")?;
        Ok(StoredObject {
            stored_key: body.key,
        })
    }
}

#[async_trait]
impl AssetRegistry for HttpBackend {
    async fn register_asset(&self, record: AssetRecord) -> Result<()> {
        let url = require_endpoint(&self.endpoints.register_url, "asset registry")?;
        let response = self
            .client
            .post(url)
            .json(&RegisterRequest {
                kind: &record.kind,
                url: &record.url,
                size: record.size_bytes,
                mime_type: &record.mime_type,
            })
            .send()
            .await
            .context("register graffiti asset")?;
        ensure_success(response, "asset registry")?;
        Ok(())
    }
}
