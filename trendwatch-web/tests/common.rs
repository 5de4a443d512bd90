use std::sync::OnceLock;

use trendwatch_common::LogFormat;
use trendwatch_common::observability::{LogConfig, init_logging};

static INIT_PATH: OnceLock<std::path::PathBuf> = OnceLock::new();

pub fn init_test_tracing() {
    let _ = INIT_PATH.get_or_init(|| {
        let format = match std::env::var("TRENDWATCH_LOG_FORMAT") {
            Ok(raw) if raw.trim().eq_ignore_ascii_case("json") => LogFormat::Json,
            _ => LogFormat::Text,
        };
        let config = LogConfig {
            app_name: "trendwatch-tests",
            log_dir: Some(std::env::temp_dir().join("trendwatch-tests")),
            emit_stderr: true,
            format,
            default_filter: "debug",
        };
        init_logging(config).unwrap_or_default()
    });
}
