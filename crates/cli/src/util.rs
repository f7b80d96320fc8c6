use sqlhist_core::Histogram;
use tracing_subscriber::EnvFilter;

/// Logs go to stderr so the histogram on stdout stays machine-readable.
/// `RUST_LOG` wins over `--verbose`.
pub fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

pub fn format_histogram(histogram: &Histogram) -> String {
    histogram
        .iter()
        .map(|bucket| format!("{}\t{}\n", bucket.label, bucket.count))
        .collect()
}

pub fn print_histogram(histogram: &Histogram) {
    print!("{}", format_histogram(histogram));
}
