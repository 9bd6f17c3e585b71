use std::path::{Path, PathBuf};

use graffiti_pad::graffiti::GraffitiSettings;

#[test]
fn unusable_log_path_falls_back_to_stderr() {
    let settings = GraffitiSettings {
        debug_logging: true,
        ..GraffitiSettings::default()
    };
    let bad = PathBuf::from("/dev/null/sub/graffiti.log");

    graffiti_pad::logging::init_with_settings(&settings, Some(bad));
    tracing::info!("still logging");

    assert!(!Path::new("/dev/null/sub").exists());
}
