pub mod buffer;
pub mod collaborators;
pub mod error;
pub mod export;
pub mod history;
pub mod http;
pub mod input;
pub mod model;
pub mod pipeline;
pub mod render;
pub mod settings;
pub mod settings_store;
pub mod state;
pub mod surface;

pub use buffer::PixelBuffer;
pub use error::SubmitError;
pub use export::EmbedToken;
pub use history::{HistoryEntry, StrokeHistory};
pub use input::{GraffitiPad, PadCommand};
pub use model::{BrushConfig, BrushSizes, Color, Point};
pub use pipeline::{
    Collaborators, DownloadBase, PipelineConfig, SubmissionPipeline, SubmissionReceipt,
};
pub use settings::GraffitiSettings;
pub use state::SubmissionPhase;
pub use surface::{RasterSurface, StrokeSession};

/// Builds a pad sized and styled from `settings`.
pub fn pad_from_settings(settings: &GraffitiSettings) -> GraffitiPad {
    GraffitiPad::with_history_limit(
        settings.canvas_width,
        settings.canvas_height,
        settings.default_brush(),
        settings.max_history,
    )
}
