use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Compact single-line output for interactive runs.
    Compact,
    /// One JSON object per event, for scheduled runs whose logs are shipped elsewhere.
    Json,
}

/// Filter used when `RUST_LOG` is unset. Verbose also lets dependencies log at info.
fn default_directives(verbose: bool) -> &'static str {
    if verbose {
        "catalog_sync=debug,info"
    } else {
        "catalog_sync=info"
    }
}

pub fn init_logger(format: LogFormat, verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(verbose)));

    let base = fmt::layer()
        .with_target(false)
        .with_file(false)
        .with_line_number(false);
    let layer = match format {
        LogFormat::Compact => base.compact().boxed(),
        LogFormat::Json => base.json().boxed(),
    };

    tracing_subscriber::registry().with(filter).with(layer).init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directives_parse() {
        for verbose in [false, true] {
            let directives = default_directives(verbose);
            assert!(EnvFilter::try_new(directives).is_ok(), "{}", directives);
        }
        assert!(default_directives(true).contains("catalog_sync=debug"));
    }
}
