use tracing_subscriber::EnvFilter;

/// Initialise logging to stderr.
///
/// `RUST_LOG` overrides the default level (`info`, or `debug` with
/// `--debug`). ANSI colors are used only when stderr is a terminal.
pub fn init(json: bool, debug: bool) {
    let level = if debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    let _ = if json {
        builder.json().try_init()
    } else {
        builder
            .with_ansi(atty::is(atty::Stream::Stderr))
            .try_init()
    };
}
