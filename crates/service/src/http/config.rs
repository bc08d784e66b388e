use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    // Listen address
    pub listen_addr: SocketAddr,
    // log level for http tracing
    pub log_level: tracing::Level,
    // Directory holding the `css/` and `js/` assets
    pub static_dir: PathBuf,
}

impl Config {
    pub fn new(listen_addr: SocketAddr, static_dir: impl Into<PathBuf>) -> Self {
        let static_dir = static_dir.into();
        tracing::info!(
            "Creating HTTP server Config: listen_addr={}, static_dir={}",
            listen_addr,
            static_dir.display()
        );
        Self {
            listen_addr,
            log_level: tracing::Level::INFO,
            static_dir,
        }
    }

    pub fn with_log_level(mut self, log_level: tracing::Level) -> Self {
        self.log_level = log_level;
        self
    }
}
