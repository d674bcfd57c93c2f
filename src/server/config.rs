use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::domain::CorruptReadPolicy;

pub const DEFAULT_PORT: u16 = 24585;

/// Allows the bundle's own assets plus the third-party style and icon CDNs
/// the form pulls in.
pub const DEFAULT_CSP: &str = "default-src 'self'; \
script-src 'self' 'unsafe-inline' https://unpkg.com; \
style-src 'self' 'unsafe-inline' https://unpkg.com https://fonts.googleapis.com; \
font-src 'self' data: https://unpkg.com https://fonts.gstatic.com; \
img-src 'self' data:; \
connect-src 'self'";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CorruptRead {
    /// Start with an empty document and keep serving
    TreatAsEmpty,
    /// Refuse to start and fail requests
    Fail,
}

impl From<CorruptRead> for CorruptReadPolicy {
    fn from(value: CorruptRead) -> Self {
        match value {
            CorruptRead::TreatAsEmpty => CorruptReadPolicy::TreatAsEmpty,
            CorruptRead::Fail => CorruptReadPolicy::Fail,
        }
    }
}

/// Server settings, read from flags with environment fallbacks.
#[derive(Parser, Debug, Clone)]
#[command(name = "intake-server", version, about = "Serves the intake form and stores submissions")]
pub struct ServerConfig {
    /// Port to listen on
    #[arg(long, env = "SERVER_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Address to bind
    #[arg(long, env = "INTAKE_BIND", default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    pub bind: IpAddr,

    /// JSON document holding all submissions
    #[arg(long, env = "INTAKE_DATA_FILE", default_value = "submissions.json")]
    pub data_file: PathBuf,

    /// Built frontend bundle
    #[arg(long, env = "INTAKE_DIST_DIR", default_value = "dist")]
    pub dist_dir: PathBuf,

    /// What to do when the submissions file cannot be read
    #[arg(long, env = "INTAKE_ON_CORRUPT_READ", value_enum, default_value_t = CorruptRead::TreatAsEmpty)]
    pub on_corrupt_read: CorruptRead,

    /// Content-Security-Policy sent with every response
    #[arg(long, env = "INTAKE_CSP", default_value = DEFAULT_CSP)]
    pub csp: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            bind: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            data_file: PathBuf::from("submissions.json"),
            dist_dir: PathBuf::from("dist"),
            on_corrupt_read: CorruptRead::TreatAsEmpty,
            csp: DEFAULT_CSP.to_string(),
        }
    }
}

impl ServerConfig {
    pub fn address(&self) -> SocketAddr {
        SocketAddr::new(self.bind, self.port)
    }

    pub fn corrupt_read_policy(&self) -> CorruptReadPolicy {
        self.on_corrupt_read.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::try_parse_from(["intake-server"]).unwrap();
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.data_file, PathBuf::from("submissions.json"));
        assert_eq!(config.corrupt_read_policy(), CorruptReadPolicy::TreatAsEmpty);
        assert_eq!(config.address().to_string(), "0.0.0.0:24585");
    }

    #[test]
    fn test_flags_override_defaults() {
        let config = ServerConfig::try_parse_from([
            "intake-server",
            "--port",
            "8080",
            "--bind",
            "127.0.0.1",
            "--on-corrupt-read",
            "fail",
            "--data-file",
            "/var/lib/intake/submissions.json",
        ])
        .unwrap();
        assert_eq!(config.address().to_string(), "127.0.0.1:8080");
        assert_eq!(config.corrupt_read_policy(), CorruptReadPolicy::Fail);
        assert_eq!(
            config.data_file,
            PathBuf::from("/var/lib/intake/submissions.json")
        );
    }

    #[test]
    fn test_invalid_port_is_rejected() {
        assert!(ServerConfig::try_parse_from(["intake-server", "--port", "99999"]).is_err());
    }
}
