//! Boundary contracts the submission pipeline consumes.
//!
//! The pipeline only sees these traits; `graffiti::http` provides the
//! network-backed implementations and tests supply in-memory doubles.

use anyhow::Result;
use async_trait::async_trait;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserIdentity {
    pub id: String,
    pub handle: String,
}

pub trait IdentityProvider: Send + Sync {
    /// `None` when nobody is signed in.
    fn current_user(&self) -> Option<UserIdentity>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadCredential {
    pub token: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub stored_key: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetRecord {
    pub kind: String,
    pub url: String,
    pub size_bytes: u64,
    pub mime_type: String,
}

#[async_trait]
pub trait DownloadBaseResolver: Send + Sync {
    async fn resolve_download_base(&self) -> Result<String>;
}

#[async_trait]
pub trait CredentialIssuer: Send + Sync {
    async fn issue_upload_credential(&self, object_key: &str) -> Result<UploadCredential>;
}

#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn upload(
        &self,
        bytes: Vec<u8>,
        mime_type: &str,
        object_key: &str,
        credential: &UploadCredential,
    ) -> Result<StoredObject>;
}

#[async_trait]
pub trait AssetRegistry: Send + Sync {
    async fn register_asset(&self, record: AssetRecord) -> Result<()>;
}
