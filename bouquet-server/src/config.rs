//! Server configuration from the command line and environment.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use clap::Parser;

/// Default port for the bouquet server.
pub const DEFAULT_PORT: u16 = 9474;

/// Command-line arguments for the bouquet server.
#[derive(Debug, Clone, Parser)]
#[command(name = "digibouquet")]
#[command(about = "Stores shared bouquets and renders their cards")]
#[command(version)]
pub struct ServerArgs {
    /// Address to bind to
    #[arg(long, env = "BOUQUET_HOST", default_value = "127.0.0.1")]
    pub host: IpAddr,

    /// Port to listen on
    #[arg(long, env = "BOUQUET_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Directory for persisted bouquets (in-memory only when unset)
    #[arg(long, env = "BOUQUET_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Directory holding flower and bush images for rendered cards
    #[arg(long, env = "BOUQUET_ASSET_ROOT")]
    pub asset_root: Option<PathBuf>,

    /// JSON flower catalog (built-in catalog when unset)
    #[arg(long, env = "BOUQUET_CATALOG")]
    pub catalog: Option<PathBuf>,
}

/// Resolved server configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Socket address to bind.
    pub addr: SocketAddr,
    /// Directory for persisted bouquets.
    pub data_dir: Option<PathBuf>,
    /// Directory holding card assets.
    pub asset_root: Option<PathBuf>,
    /// Flower catalog file.
    pub catalog: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), DEFAULT_PORT),
            data_dir: None,
            asset_root: None,
            catalog: None,
        }
    }
}

impl From<ServerArgs> for ServerConfig {
    fn from(args: ServerArgs) -> Self {
        Self {
            addr: SocketAddr::new(args.host, args.port),
            data_dir: args.data_dir,
            asset_root: args.asset_root,
            catalog: args.catalog,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = ServerArgs::try_parse_from(["digibouquet"]).expect("parse");
        let config = ServerConfig::from(args);
        assert_eq!(config, ServerConfig::default());
    }

    #[test]
    fn test_flags_override_defaults() {
        let args = ServerArgs::try_parse_from([
            "digibouquet",
            "--host",
            "0.0.0.0",
            "--port",
            "8088",
            "--data-dir",
            "/var/lib/digibouquet",
        ])
        .expect("parse");
        let config = ServerConfig::from(args);
        assert_eq!(config.addr.to_string(), "0.0.0.0:8088");
        assert_eq!(
            config.data_dir.as_deref(),
            Some(std::path::Path::new("/var/lib/digibouquet"))
        );
        assert!(config.asset_root.is_none());
    }

    #[test]
    fn test_rejects_bad_port() {
        assert!(ServerArgs::try_parse_from(["digibouquet", "--port", "99999"]).is_err());
    }
}
