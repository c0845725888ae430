use std::sync::OnceLock;

use pulse_common::observability::{init_logging, LogConfig};

static INIT_PATH: OnceLock<std::path::PathBuf> = OnceLock::new();

pub fn init_test_tracing() {
    let _ = INIT_PATH.get_or_init(|| {
        init_logging(LogConfig {
            app_name: "pulse-tests",
            emit_stderr: true,
            default_filter: "debug",
            ..LogConfig::default()
        })
        .unwrap_or_default()
    });
}
