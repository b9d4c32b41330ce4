use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub security: SecurityConfig,
    pub api: ApiConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Staging,
    Production,
}

impl Environment {
    /// Unknown names fall back to staging
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "production" | "prod" => Environment::Production,
            _ => Environment::Staging,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub http_port: u16,
    pub https_port: u16,
    pub tls_cert_path: Option<PathBuf>,
    pub tls_key_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Root of the record store; each resource type is a subdirectory
    pub data_dir: PathBuf,
    /// Directory served under the `public/` path prefix
    pub public_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub hashing_secret: String,
    pub token_ttl_ms: i64,
    pub token_id_length: usize,
    pub enforce_ownership: bool,
    pub enable_cors: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub max_request_size_bytes: usize,
}

impl ServerConfig {
    /// Both halves of the key pair must be configured for HTTPS to start
    pub fn tls_paths(&self) -> Option<(&PathBuf, &PathBuf)> {
        match (&self.tls_cert_path, &self.tls_key_path) {
            (Some(cert), Some(key)) => Some((cert, key)),
            _ => None,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = env::var("APP_ENV")
            .map(|name| Environment::from_name(&name))
            .unwrap_or(Environment::Staging);

        Self::load(environment)
    }

    /// Preset for `environment` with env-var overrides applied
    pub fn load(environment: Environment) -> Self {
        Self::for_environment(environment).with_env_overrides()
    }

    pub fn for_environment(environment: Environment) -> Self {
        match environment {
            Environment::Staging => Self::staging(),
            Environment::Production => Self::production(),
        }
    }

    fn with_env_overrides(mut self) -> Self {
        // Server overrides
        if let Ok(v) = env::var("SERVER_HOST") {
            self.server.host = v;
        }
        if let Ok(v) = env::var("HTTP_PORT") {
            self.server.http_port = v.parse().unwrap_or(self.server.http_port);
        }
        if let Ok(v) = env::var("HTTPS_PORT") {
            self.server.https_port = v.parse().unwrap_or(self.server.https_port);
        }
        if let Ok(v) = env::var("TLS_CERT_PATH") {
            self.server.tls_cert_path = Some(PathBuf::from(v));
        }
        if let Ok(v) = env::var("TLS_KEY_PATH") {
            self.server.tls_key_path = Some(PathBuf::from(v));
        }

        // Storage overrides
        if let Ok(v) = env::var("DATA_DIR") {
            self.storage.data_dir = PathBuf::from(v);
        }
        if let Ok(v) = env::var("PUBLIC_DIR") {
            self.storage.public_dir = PathBuf::from(v);
        }

        // Security overrides
        if let Ok(v) = env::var("HASHING_SECRET") {
            if !v.is_empty() {
                self.security.hashing_secret = v;
            }
        }
        if let Ok(v) = env::var("TOKEN_TTL_MS") {
            self.security.token_ttl_ms = v.parse().unwrap_or(self.security.token_ttl_ms);
        }
        if let Ok(v) = env::var("ENFORCE_OWNERSHIP") {
            self.security.enforce_ownership = v.parse().unwrap_or(self.security.enforce_ownership);
        }
        if let Ok(v) = env::var("ENABLE_CORS") {
            self.security.enable_cors = v.parse().unwrap_or(self.security.enable_cors);
        }

        // API overrides
        if let Ok(v) = env::var("API_MAX_REQUEST_SIZE_BYTES") {
            self.api.max_request_size_bytes = v.parse().unwrap_or(self.api.max_request_size_bytes);
        }

        self
    }

    pub fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                http_port: 3000,
                https_port: 3001,
                tls_cert_path: None,
                tls_key_path: None,
            },
            storage: StorageConfig {
                data_dir: PathBuf::from(".data"),
                public_dir: PathBuf::from("public"),
            },
            security: SecurityConfig {
                hashing_secret: "thisIsASecret".to_string(),
                token_ttl_ms: 60 * 60 * 1000, // 1 hour
                token_id_length: 20,
                enforce_ownership: false,
                enable_cors: true,
            },
            api: ApiConfig {
                max_request_size_bytes: 1024 * 1024, // 1MB
            },
        }
    }

    pub fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                http_port: 5000,
                https_port: 5001,
                tls_cert_path: None,
                tls_key_path: None,
            },
            storage: StorageConfig {
                data_dir: PathBuf::from(".data"),
                public_dir: PathBuf::from("public"),
            },
            security: SecurityConfig {
                hashing_secret: "thisIsAlsoASecret".to_string(),
                token_ttl_ms: 60 * 60 * 1000,
                token_id_length: 20,
                enforce_ownership: false,
                enable_cors: false,
            },
            api: ApiConfig {
                max_request_size_bytes: 256 * 1024,
            },
        }
    }
}
