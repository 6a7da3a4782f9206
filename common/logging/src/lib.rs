//! Ambient structured logging for the JAM state-transition core.
//!
//! Ported from the teacher stack's `common/logging`, trimmed to what a
//! networking-free core needs: the structured console/file `tracing::Layer`
//! plus a debounce helper and rolling-file setup. The libp2p/discv5
//! per-protocol log-file splitting, the SSE log-stream component, and the
//! Prometheus metrics layer that crate also carries do not apply here (this
//! core has no networking or RPC surface, see `spec.md` §1 Non-goals) and
//! are dropped rather than carried as dead weight.

use logroller::{Compression, LogRollerBuilder, Rotation, RotationSize};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::EnvFilter;

pub mod tracing_logging_layer;

pub use tracing_logging_layer::LoggingLayer;

/// The minimum interval between repeats of a debounced log message.
const LOG_DEBOUNCE_INTERVAL: Duration = Duration::from_secs(30);

/// De-bounce helper for log call sites that would otherwise fire once per
/// block (e.g. a per-block warning about a dropped authorization queue
/// entry). Mirrors the teacher's `TimeLatch`.
#[derive(Default)]
pub struct TimeLatch(Option<Instant>);

impl TimeLatch {
    /// Only returns true once every `LOG_DEBOUNCE_INTERVAL`.
    pub fn elapsed(&mut self) -> bool {
        let now = Instant::now();
        let is_elapsed = self.0.is_some_and(|elapse_time| now > elapse_time);
        if is_elapsed || self.0.is_none() {
            self.0 = Some(now + LOG_DEBOUNCE_INTERVAL);
        }
        is_elapsed
    }
}

/// Builds a rolling-file non-blocking writer rooted at `log_dir/jam_node.log`,
/// mirroring the teacher's `LogRollerBuilder` usage for its per-protocol log
/// files, minus the protocol-specific file splitting.
pub fn rolling_file_writer(
    log_dir: PathBuf,
    max_log_size_mb: u64,
    max_log_number: usize,
    compress: bool,
) -> std::io::Result<(NonBlocking, WorkerGuard)> {
    let mut builder = LogRollerBuilder::new(log_dir, PathBuf::from("jam_node.log"))
        .rotation(Rotation::SizeBased(RotationSize::MB(max_log_size_mb)))
        .max_keep_files(max_log_number.try_into().unwrap_or(10));
    if compress {
        builder = builder.compression(Compression::Gzip);
    }
    let writer = builder
        .build()
        .map_err(|e| std::io::Error::other(e.to_string()))?;
    Ok(NonBlocking::new(writer))
}

/// Installs a global `tracing` subscriber writing to stdout, either plain
/// text or JSON (mirrors `jam_node`'s `--log-format` flag).
pub fn init_console_logging(json: bool, debug: bool) {
    let level = if debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let subscriber = tracing_subscriber::fmt().with_env_filter(filter);
    let result = if json {
        subscriber.json().try_init()
    } else {
        subscriber.try_init()
    };
    if let Err(e) = result {
        eprintln!("failed to install tracing subscriber: {e}");
    }
}

/// Return a tracing subscriber suitable for test usage.
///
/// By default no logs are printed; enable with `--features logging/test_logger`.
pub fn create_test_tracing_subscriber() {
    if cfg!(feature = "test_logger") {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::try_new("debug").unwrap())
            .try_init();
    }
}
