use crate::graffiti::settings::GraffitiSettings;
use anyhow::{anyhow, Context, Result};
use std::path::{Path, PathBuf};

pub const GRAFFITI_SETTINGS_FILE_NAME: &str = "graffiti_settings.json";

pub fn settings_path_from_exe_path(exe_path: &Path) -> Result<PathBuf> {
    let parent = exe_path
        .parent()
        .ok_or_else(|| anyhow!("executable path has no parent: {}", exe_path.display()))?;
    Ok(parent.join(GRAFFITI_SETTINGS_FILE_NAME))
}

pub fn resolve_settings_path() -> Result<PathBuf> {
    let exe_path = std::env::current_exe().context("resolve current executable")?;
    settings_path_from_exe_path(&exe_path)
}

/// Loads the settings next to the executable, falling back to defaults.
pub fn load() -> Result<GraffitiSettings> {
    let path = resolve_settings_path()?;
    Ok(load_from_path(&path)?.unwrap_or_default())
}

pub fn save(settings: &GraffitiSettings) -> Result<PathBuf> {
    let path = resolve_settings_path()?;
    save_to_path(&path, settings)?;
    Ok(path)
}

pub fn load_from_path(path: &Path) -> Result<Option<GraffitiSettings>> {
    if !path.exists() {
        return Ok(None);
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("read graffiti settings file {}", path.display()))?;

    if content.trim().is_empty() {
        return Ok(Some(GraffitiSettings::default()));
    }

    let stored: GraffitiSettings = serde_json::from_str(&content)
        .with_context(|| format!("deserialize graffiti settings file {}", path.display()))?;
    let mut loaded = stored.clone();
    loaded.sanitize();
    if loaded != stored {
        tracing::warn!(
            path = %path.display(),
            canvas = %format!("{}x{}", loaded.canvas_width, loaded.canvas_height),
            brush_sizes = ?loaded.brush_sizes,
            embed_tag = %loaded.embed_tag,
            "graffiti settings contained invalid values; using repaired copy"
        );
    }
    Ok(Some(loaded))
}

pub fn save_to_path(path: &Path, settings: &GraffitiSettings) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).with_context(|| {
            format!("create graffiti settings parent folder {}", parent.display())
        })?;
    }

    let mut sanitized = settings.clone();
    sanitized.sanitize();
    let json = serde_json::to_string_pretty(&sanitized).context("serialize graffiti settings")?;
    std::fs::write(path, json)
        .with_context(|| format!("write graffiti settings file {}", path.display()))
}
