use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;
const DEFAULT_CERTIFICATE_VALIDITY_DAYS: u32 = 90;
const DEFAULT_VERIFY_BASE_URL: &str = "https://keycred.io/verify";

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub uploads: UploadConfig,
    pub certificates: CertificateConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let max_bytes = match env::var("APP_MAX_UPLOAD_BYTES") {
            Ok(raw) => raw
                .trim()
                .parse::<usize>()
                .ok()
                .filter(|bytes| *bytes > 0)
                .ok_or(ConfigError::InvalidUploadLimit)?,
            Err(_) => DEFAULT_MAX_UPLOAD_BYTES,
        };

        let validity_days = match env::var("APP_CERTIFICATE_VALIDITY_DAYS") {
            Ok(raw) => raw
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|days| *days > 0)
                .ok_or(ConfigError::InvalidCertificateValidity)?,
            Err(_) => DEFAULT_CERTIFICATE_VALIDITY_DAYS,
        };

        let verify_base_url = env::var("APP_CERTIFICATE_VERIFY_BASE_URL")
            .map(|url| url.trim().to_string())
            .unwrap_or_else(|_| DEFAULT_VERIFY_BASE_URL.to_string());
        if !verify_base_url.starts_with("https://") && !verify_base_url.starts_with("http://") {
            return Err(ConfigError::InvalidVerifyUrl(verify_base_url));
        }

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            uploads: UploadConfig { max_bytes },
            certificates: CertificateConfig {
                validity_days,
                verify_base_url,
            },
        })
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing and metrics controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Limits applied to uploaded receipt documents.
#[derive(Debug, Clone)]
pub struct UploadConfig {
    pub max_bytes: usize,
}

/// Parameters handed to the certificate ticket builder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateConfig {
    pub validity_days: u32,
    pub verify_base_url: String,
}

impl Default for CertificateConfig {
    fn default() -> Self {
        Self {
            validity_days: DEFAULT_CERTIFICATE_VALIDITY_DAYS,
            verify_base_url: DEFAULT_VERIFY_BASE_URL.to_string(),
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidUploadLimit,
    InvalidCertificateValidity,
    InvalidVerifyUrl(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidUploadLimit => {
                write!(f, "APP_MAX_UPLOAD_BYTES must be a positive integer")
            }
            ConfigError::InvalidCertificateValidity => {
                write!(f, "APP_CERTIFICATE_VALIDITY_DAYS must be a positive integer")
            }
            ConfigError::InvalidVerifyUrl(url) => write!(
                f,
                "APP_CERTIFICATE_VERIFY_BASE_URL must be an http(s) URL, got '{}'",
                url
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            _ => None,
        }
    }
}
