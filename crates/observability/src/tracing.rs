//! Tracing/logging initialization.

use tracing_subscriber::EnvFilter;

/// Output format of the log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// One JSON object per line (production).
    Json,
    /// Human-readable lines (development, tests).
    Pretty,
}

impl LogFormat {
    pub fn for_production(production: bool) -> Self {
        if production { Self::Json } else { Self::Pretty }
    }
}

/// Filter directives: `RUST_LOG` when set, otherwise `level`, otherwise `info`.
fn filter_directives(rust_log: Option<String>, level: &str) -> String {
    rust_log
        .filter(|v| !v.trim().is_empty())
        .or_else(|| Some(level.trim().to_string()).filter(|l| !l.is_empty()))
        .unwrap_or_else(|| "info".to_string())
}

fn build_filter(directives: &str) -> EnvFilter {
    EnvFilter::try_new(directives).unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Initialize tracing/logging for the process.
///
/// Safe to call multiple times (subsequent calls are no-ops).
pub fn init(level: &str, format: LogFormat) {
    let directives = filter_directives(std::env::var("RUST_LOG").ok(), level);
    let filter = build_filter(&directives);

    let _ = match format {
        LogFormat::Json => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .with_timer(tracing_subscriber::fmt::time::SystemTime)
            .with_target(false)
            .try_init(),
        LogFormat::Pretty => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .try_init(),
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rust_log_wins_over_level() {
        assert_eq!(
            filter_directives(Some("debug,sqlx=warn".to_string()), "error"),
            "debug,sqlx=warn"
        );
        assert_eq!(filter_directives(None, "warn"), "warn");
        assert_eq!(filter_directives(Some("  ".to_string()), ""), "info");
    }

    #[test]
    fn bad_directives_fall_back_to_info() {
        assert!(EnvFilter::try_new("app=loudest").is_err());
        let filter = build_filter("app=loudest");
        assert_eq!(filter.max_level_hint(), Some(tracing::level_filters::LevelFilter::INFO));
    }

    #[test]
    fn format_follows_environment() {
        assert_eq!(LogFormat::for_production(true), LogFormat::Json);
        assert_eq!(LogFormat::for_production(false), LogFormat::Pretty);
    }

    #[test]
    fn init_twice_is_harmless() {
        init("info", LogFormat::Pretty);
        init("debug", LogFormat::Json);
    }
}
