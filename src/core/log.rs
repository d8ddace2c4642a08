use tracing::level_filters::LevelFilter;
use tracing_subscriber::{
    EnvFilter, filter::Targets, fmt, prelude::__tracing_subscriber_SubscriberExt,
    util::SubscriberInitExt,
};

/// Directives used when `RUST_LOG` is unset.
fn default_directives(verbose: bool) -> &'static str {
    if verbose {
        "riskboard=debug,warn"
    } else {
        "off"
    }
}

/// Installs the global subscriber. Logs go to stderr so they never interleave
/// with rendered tables. `RUST_LOG` wins over `--verbose`.
pub fn init_logging(verbose: bool) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(verbose)));
    // Dependencies (hyper, reqwest) never log below info, whatever RUST_LOG says.
    let noise_filter = Targets::new()
        .with_default(LevelFilter::INFO)
        .with_target("riskboard", LevelFilter::TRACE);

    tracing_subscriber::registry()
        .with(fmt::layer().pretty().without_time().with_writer(std::io::stderr))
        .with(noise_filter)
        .with(env_filter)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directives_parse() {
        for verbose in [true, false] {
            assert!(EnvFilter::try_new(default_directives(verbose)).is_ok());
        }
    }
}
