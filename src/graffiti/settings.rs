use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::graffiti::export::validate_embed_tag;
use crate::graffiti::model::{BrushConfig, BrushSizes, Color};
use crate::graffiti::pipeline::{
    PipelineConfig, DEFAULT_ASSET_KIND, DEFAULT_EMBED_TAG, DEFAULT_OBJECT_KEY_PREFIX,
};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct HttpEndpoints {
    #[serde(default)]
    pub download_base_url: String,
    #[serde(default)]
    pub credential_url: String,
    #[serde(default)]
    pub upload_url: String,
    #[serde(default)]
    pub register_url: String,
}

impl HttpEndpoints {
    pub fn is_configured(&self) -> bool {
        !self.credential_url.is_empty() && !self.upload_url.is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GraffitiSettings {
    #[serde(default = "default_canvas_width")]
    pub canvas_width: u32,
    #[serde(default = "default_canvas_height")]
    pub canvas_height: u32,
    #[serde(default = "default_brush_sizes")]
    pub brush_sizes: Vec<u32>,
    #[serde(default = "default_last_color")]
    pub last_color: Color,
    #[serde(default = "default_last_width")]
    pub last_width: u32,
    #[serde(default)]
    pub shadow_blur: u32,
    #[serde(default = "default_max_history")]
    pub max_history: usize,
    #[serde(default = "default_object_key_prefix")]
    pub object_key_prefix: String,
    #[serde(default = "default_embed_tag")]
    pub embed_tag: String,
    #[serde(default = "default_credential_timeout_ms")]
    pub credential_timeout_ms: u64,
    #[serde(default = "default_upload_timeout_ms")]
    pub upload_timeout_ms: u64,
    #[serde(default = "default_http_timeout_ms")]
    pub http_timeout_ms: u64,
    #[serde(default)]
    pub download_base: Option<String>,
    #[serde(default)]
    pub endpoints: HttpEndpoints,
    #[serde(default)]
    pub debug_logging: bool,
}

fn default_canvas_width() -> u32 {
    600
}

fn default_canvas_height() -> u32 {
    300
}

fn default_brush_sizes() -> Vec<u32> {
    BrushSizes::DEFAULT.to_vec()
}

fn default_last_color() -> Color {
    Color::BLACK
}

fn default_last_width() -> u32 {
    5
}

fn default_max_history() -> usize {
    50
}

fn default_object_key_prefix() -> String {
    DEFAULT_OBJECT_KEY_PREFIX.to_string()
}

fn default_embed_tag() -> String {
    DEFAULT_EMBED_TAG.to_string()
}

fn default_credential_timeout_ms() -> u64 {
    15_000
}

fn default_upload_timeout_ms() -> u64 {
    60_000
}

fn default_http_timeout_ms() -> u64 {
    30_000
}

impl Default for GraffitiSettings {
    fn default() -> Self {
        Self {
            canvas_width: default_canvas_width(),
            canvas_height: default_canvas_height(),
            brush_sizes: default_brush_sizes(),
            last_color: default_last_color(),
            last_width: default_last_width(),
            shadow_blur: 0,
            max_history: default_max_history(),
            object_key_prefix: default_object_key_prefix(),
            embed_tag: default_embed_tag(),
            credential_timeout_ms: default_credential_timeout_ms(),
            upload_timeout_ms: default_upload_timeout_ms(),
            http_timeout_ms: default_http_timeout_ms(),
            download_base: None,
            endpoints: HttpEndpoints::default(),
            debug_logging: false,
        }
    }
}

impl GraffitiSettings {
    /// Replaces values that would leave the pad or the pipeline unusable.
    pub fn sanitize(&mut self) {
        if self.canvas_width == 0 {
            self.canvas_width = default_canvas_width();
        }
        if self.canvas_height == 0 {
            self.canvas_height = default_canvas_height();
        }
        let sizes = BrushSizes::new(self.brush_sizes.iter().copied());
        self.brush_sizes = sizes.as_slice().to_vec();
        self.last_width = sizes.clamp(self.last_width);
        if validate_embed_tag(&self.embed_tag).is_err() {
            tracing::warn!(tag = %self.embed_tag, "invalid embed tag in settings; using default");
            self.embed_tag = default_embed_tag();
        }
        if self.object_key_prefix.trim_matches('/').is_empty() {
            self.object_key_prefix = default_object_key_prefix();
        }
        if self.credential_timeout_ms == 0 {
            self.credential_timeout_ms = default_credential_timeout_ms();
        }
        if self.upload_timeout_ms == 0 {
            self.upload_timeout_ms = default_upload_timeout_ms();
        }
        if self.http_timeout_ms == 0 {
            self.http_timeout_ms = default_http_timeout_ms();
        }
        if self
            .download_base
            .as_deref()
            .is_some_and(|base| base.trim().is_empty())
        {
            self.download_base = None;
        }
    }

    pub fn brush_sizes(&self) -> BrushSizes {
        BrushSizes::new(self.brush_sizes.iter().copied())
    }

    pub fn default_brush(&self) -> BrushConfig {
        BrushConfig::new(
            self.last_color,
            self.last_width,
            self.shadow_blur,
            self.brush_sizes(),
        )
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_millis(self.http_timeout_ms)
    }

    pub fn to_pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            object_key_prefix: self.object_key_prefix.clone(),
            embed_tag: self.embed_tag.clone(),
            asset_kind: DEFAULT_ASSET_KIND.to_string(),
            credential_timeout: Duration::from_millis(self.credential_timeout_ms),
            upload_timeout: Duration::from_millis(self.upload_timeout_ms),
        }
    }
}
