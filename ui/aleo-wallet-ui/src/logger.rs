//! Log setup. Native builds log to stderr and honour `RUST_LOG`; the web
//! build forwards to the browser console.

#[cfg(not(target_arch = "wasm32"))]
pub fn init() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    // dioxus may have installed its own subscriber already
    if let Err(e) = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
    {
        eprintln!("logger already initialized: {e}");
    }
}

#[cfg(target_arch = "wasm32")]
pub fn init() {
    if let Err(e) = dioxus::logger::init(tracing::Level::DEBUG) {
        tracing::warn!("logger already initialized: {e}");
    }
}
