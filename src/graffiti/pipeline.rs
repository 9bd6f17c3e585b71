use crate::graffiti::buffer::PixelBuffer;
use crate::graffiti::collaborators::{
    AssetRecord, AssetRegistry, CredentialIssuer, DownloadBaseResolver, IdentityProvider,
    ObjectStore, UserIdentity,
};
use crate::graffiti::error::SubmitError;
use crate::graffiti::export::{
    encode_png, generate_object_key, join_download_url, validate_embed_tag, EmbedToken,
};
use crate::graffiti::input::GraffitiPad;
use crate::graffiti::state::{can_transition, SubmissionPhase};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_OBJECT_KEY_PREFIX: &str = "graffiti";
pub const DEFAULT_EMBED_TAG: &str = "graffiti";
pub const DEFAULT_ASSET_KIND: &str = "image";
pub const DEFAULT_CREDENTIAL_TIMEOUT: Duration = Duration::from_secs(15);
pub const DEFAULT_UPLOAD_TIMEOUT: Duration = Duration::from_secs(60);

/// Where public asset URLs are rooted.
#[derive(Clone)]
pub enum DownloadBase {
    Resolved(String),
    /// Asked once per pipeline; the answer is cached after the first success.
    Resolver(Arc<dyn DownloadBaseResolver>),
}

#[derive(Clone)]
pub struct Collaborators {
    pub identity: Arc<dyn IdentityProvider>,
    pub download_base: DownloadBase,
    pub issuer: Arc<dyn CredentialIssuer>,
    pub store: Arc<dyn ObjectStore>,
    pub registry: Arc<dyn AssetRegistry>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    pub object_key_prefix: String,
    pub embed_tag: String,
    pub asset_kind: String,
    pub credential_timeout: Duration,
    pub upload_timeout: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            object_key_prefix: DEFAULT_OBJECT_KEY_PREFIX.to_string(),
            embed_tag: DEFAULT_EMBED_TAG.to_string(),
            asset_kind: DEFAULT_ASSET_KIND.to_string(),
            credential_timeout: DEFAULT_CREDENTIAL_TIMEOUT,
            upload_timeout: DEFAULT_UPLOAD_TIMEOUT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionReceipt {
    pub object_key: String,
    pub url: String,
    pub size_bytes: u64,
    pub mime_type: String,
    pub embed: EmbedToken,
}

/// Turns the pad's pixels into an uploaded image and an embed token.
///
/// One pipeline serves one pad; `submit` takes `&mut self`, so a second
/// submission cannot start while one is in flight.
pub struct SubmissionPipeline {
    collaborators: Collaborators,
    config: PipelineConfig,
    download_base: Option<String>,
    phase: SubmissionPhase,
}

impl SubmissionPipeline {
    pub fn new(collaborators: Collaborators, config: PipelineConfig) -> Result<Self, SubmitError> {
        validate_embed_tag(&config.embed_tag)?;
        let download_base = match &collaborators.download_base {
            DownloadBase::Resolved(base) => Some(base.clone()),
            DownloadBase::Resolver(_) => None,
        };
        Ok(Self {
            collaborators,
            config,
            download_base,
            phase: SubmissionPhase::Idle,
        })
    }

    pub fn phase(&self) -> SubmissionPhase {
        self.phase
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Uploads the current drawing and hands the embed token to `on_complete`.
    ///
    /// Any failure after the preconditions pass wipes the pad before the
    /// error is returned; success wipes it as well. Dropping the returned
    /// future abandons the submission without clearing the pad. A gesture
    /// still held down is committed first, so it is part of the upload.
    pub async fn submit<F>(
        &mut self,
        pad: &mut GraffitiPad,
        on_complete: F,
    ) -> Result<SubmissionReceipt, SubmitError>
    where
        F: FnOnce(&EmbedToken),
    {
        let Some(user) = self.collaborators.identity.current_user() else {
            tracing::info!("graffiti submit rejected: not signed in");
            return Err(SubmitError::AuthRequired);
        };
        pad.commit_pending_stroke();
        if !pad.has_drawing() {
            tracing::info!("graffiti submit rejected: empty canvas");
            return Err(SubmitError::EmptyCanvas);
        }

        let snapshot = pad.snapshot();
        let mut phase = PhaseGuard::new(&mut self.phase);
        let outcome = upload_drawing(
            &mut phase,
            &self.collaborators,
            &self.config,
            &mut self.download_base,
            &snapshot,
            &user,
        )
        .await;
        phase.finish();
        pad.clear();

        match outcome {
            Ok(uploaded) => {
                tracing::info!(
                    object_key = %uploaded.receipt.object_key,
                    size_bytes = uploaded.receipt.size_bytes,
                    "graffiti uploaded"
                );
                register_detached(
                    Arc::clone(&self.collaborators.registry),
                    uploaded.record,
                );
                on_complete(&uploaded.receipt.embed);
                Ok(uploaded.receipt)
            }
            Err(err) => {
                tracing::error!(error = %err, "graffiti submission failed; canvas cleared");
                Err(err)
            }
        }
    }
}

struct Uploaded {
    receipt: SubmissionReceipt,
    record: AssetRecord,
}

async fn upload_drawing(
    phase: &mut PhaseGuard<'_>,
    collaborators: &Collaborators,
    config: &PipelineConfig,
    cached_base: &mut Option<String>,
    snapshot: &PixelBuffer,
    user: &UserIdentity,
) -> Result<Uploaded, SubmitError> {
    phase.advance(SubmissionPhase::Encoding);
    let encoded = encode_png(snapshot)?;
    let object_key = generate_object_key(&config.object_key_prefix, user, encoded.extension);
    tracing::debug!(%object_key, size_bytes = encoded.size_bytes(), "graffiti encoded");

    phase.advance(SubmissionPhase::AwaitingCredential);
    let base = resolve_download_base(&collaborators.download_base, cached_base).await?;
    let credential = with_timeout(
        config.credential_timeout,
        collaborators.issuer.issue_upload_credential(&object_key),
    )
    .await
    .map_err(SubmitError::Credential)?;

    phase.advance(SubmissionPhase::Uploading);
    let size_bytes = encoded.size_bytes();
    let mime_type = encoded.mime_type.to_string();
    let stored = with_timeout(
        config.upload_timeout,
        collaborators
            .store
            .upload(encoded.bytes, &mime_type, &object_key, &credential),
    )
    .await
    .map_err(SubmitError::Upload)?;

    let url = join_download_url(&base, &stored.stored_key);
    let embed = EmbedToken::new(&config.embed_tag, &url)?;
    let record = AssetRecord {
        kind: config.asset_kind.clone(),
        url: url.clone(),
        size_bytes,
        mime_type: mime_type.clone(),
    };
    Ok(Uploaded {
        receipt: SubmissionReceipt {
            object_key: stored.stored_key,
            url,
            size_bytes,
            mime_type,
            embed,
        },
        record,
    })
}

async fn resolve_download_base(
    source: &DownloadBase,
    cached: &mut Option<String>,
) -> Result<String, SubmitError> {
    if let Some(base) = cached {
        return Ok(base.clone());
    }
    let DownloadBase::Resolver(resolver) = source else {
        return Err(SubmitError::Credential(
            "download base is not configured".to_string(),
        ));
    };
    let base = resolver
        .resolve_download_base()
        .await
        .map_err(|err| SubmitError::Credential(format!("resolve download base: {err:#}")))?;
    *cached = Some(base.clone());
    Ok(base)
}

async fn with_timeout<T, Fut>(limit: Duration, call: Fut) -> Result<T, String>
where
    Fut: Future<Output = anyhow::Result<T>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(err)) => Err(format!("{err:#}")),
        Err(_) => Err(format!("timed out after {} ms", limit.as_millis())),
    }
}

/// Registration never blocks or fails the submission.
fn register_detached(registry: Arc<dyn AssetRegistry>, record: AssetRecord) {
    let Ok(handle) = tokio::runtime::Handle::try_current() else {
        tracing::warn!(url = %record.url, "no async runtime; skipping asset registration");
        return;
    };
    handle.spawn(async move {
        let url = record.url.clone();
        if let Err(err) = registry.register_asset(record).await {
            tracing::warn!(%url, error = %format!("{err:#}"), "asset registration failed");
        }
    });
}

/// Tracks the phase of the running submission and falls back to `Idle`
/// when dropped, including when the submit future is abandoned.
struct PhaseGuard<'a> {
    phase: &'a mut SubmissionPhase,
}

impl<'a> PhaseGuard<'a> {
    fn new(phase: &'a mut SubmissionPhase) -> Self {
        *phase = SubmissionPhase::Idle;
        Self { phase }
    }

    fn advance(&mut self, next: SubmissionPhase) {
        debug_assert!(can_transition(*self.phase, next));
        tracing::debug!(from = ?*self.phase, to = ?next, "submission phase");
        *self.phase = next;
    }

    fn finish(&mut self) {
        self.advance(SubmissionPhase::Idle);
    }
}

impl Drop for PhaseGuard<'_> {
    fn drop(&mut self) {
        *self.phase = SubmissionPhase::Idle;
    }
}
