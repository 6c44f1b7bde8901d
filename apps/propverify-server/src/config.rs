//! Server configuration
//!
//! Values come from CLI flags, falling back to environment variables (a
//! `.env` file is loaded first by `main`). The envelope secret has no
//! default: startup fails when it is missing.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use thiserror::Error;
use verification_engine::{DEFAULT_LLM_TIMEOUT_MS, DEFAULT_MODEL, DEFAULT_OLLAMA_URL};

/// Command-line arguments for the PropVerify server
#[derive(Parser, Debug, Clone)]
#[command(name = "propverify-server")]
#[command(about = "PropVerify server for AI-assisted property document verification")]
pub struct Args {
    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value = "4000")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "0.0.0.0")]
    pub host: String,

    /// Ollama-compatible generate endpoint
    #[arg(long, env = "OLLAMA_URL", default_value = DEFAULT_OLLAMA_URL)]
    pub ollama_url: String,

    /// Model identifier sent with every request
    #[arg(long, env = "OLLAMA_MODEL", default_value = DEFAULT_MODEL)]
    pub model: String,

    /// Secret the payload envelope key is derived from
    #[arg(long, env = "AES_SECRET_KEY", hide_env_values = true)]
    pub secret: Option<String>,

    /// Deadline for one LLM call in milliseconds
    #[arg(long, default_value_t = DEFAULT_LLM_TIMEOUT_MS)]
    pub llm_timeout_ms: u64,

    /// Directory with the built web UI; unknown paths fall back to its index.html
    #[arg(long, env = "STATIC_DIR")]
    pub static_dir: Option<PathBuf>,

    /// Rate limit: requests per second per IP
    #[arg(long, default_value = "10")]
    pub rate_limit: u32,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("AES_SECRET_KEY is not set; refusing to start without an envelope secret")]
    MissingSecret,

    #[error("Invalid bind address {0}")]
    InvalidAddress(String),

    #[error("LLM timeout must be greater than zero")]
    ZeroTimeout,

    #[error("Rate limit must be greater than zero")]
    ZeroRateLimit,

    #[error("Static directory {0} has no index.html")]
    MissingIndex(String),
}

/// Validated server configuration
#[derive(Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub ollama_url: String,
    pub model: String,
    pub secret: String,
    pub llm_timeout: Duration,
    pub static_dir: Option<PathBuf>,
    pub rate_limit: u32,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("addr", &self.addr)
            .field("ollama_url", &self.ollama_url)
            .field("model", &self.model)
            .field("secret", &"<redacted>")
            .field("llm_timeout", &self.llm_timeout)
            .field("static_dir", &self.static_dir)
            .field("rate_limit", &self.rate_limit)
            .finish()
    }
}

impl TryFrom<Args> for Config {
    type Error = ConfigError;

    fn try_from(args: Args) -> Result<Self, Self::Error> {
        let secret = args
            .secret
            .filter(|s| !s.trim().is_empty())
            .ok_or(ConfigError::MissingSecret)?;

        let addr_str = format!("{}:{}", args.host, args.port);
        let addr: SocketAddr = addr_str
            .parse()
            .map_err(|_| ConfigError::InvalidAddress(addr_str.clone()))?;

        if args.llm_timeout_ms == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        if args.rate_limit == 0 {
            return Err(ConfigError::ZeroRateLimit);
        }

        if let Some(dir) = &args.static_dir {
            if !dir.join("index.html").is_file() {
                return Err(ConfigError::MissingIndex(dir.display().to_string()));
            }
        }

        Ok(Config {
            addr,
            ollama_url: args.ollama_url,
            model: args.model,
            secret,
            llm_timeout: Duration::from_millis(args.llm_timeout_ms),
            static_dir: args.static_dir,
            rate_limit: args.rate_limit,
        })
    }
}
