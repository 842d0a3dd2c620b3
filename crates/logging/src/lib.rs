use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Subscriber for tests: output goes through the test harness capture and a
/// second call is a no-op.
///
/// `RUST_LOG` wins when set; otherwise only warnings are shown.
pub fn init_test_subscriber() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_test_writer())
        .with(env_filter)
        .try_init();
}
