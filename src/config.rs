use std::time::Duration;

use clap::Parser;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::chat::ReplyOverlap;

/// Welcome message seeded into every new transcript.
pub const DEFAULT_WELCOME_TEXT: &str = "Welcome! Upload your PDF to start chatting.";

/// Canned assistant reply.
pub const DEFAULT_REPLY_TEXT: &str = "I've analyzed your message. Based on the PDF content, here's what I found relevant to your query.";

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file path
    #[arg(short, long, env = "CONFIG_FILE")]
    pub config: Option<String>,

    /// Port to listen on
    #[arg(long, env = "PORT")]
    pub port: Option<u16>,

    /// Base URL of the external upload sink
    #[arg(long, env = "UPLOAD_SINK_URL")]
    pub sink_url: Option<String>,

    /// How overlapping replies are handled: concurrent, serialized or reject
    #[arg(long, env = "REPLY_OVERLAP")]
    pub reply_overlap: Option<String>,

    /// Emit logs as JSON
    #[arg(long, env = "LOG_JSON")]
    pub log_json: Option<bool>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub chat: ChatConfig,
    pub upload: UploadConfig,
    pub session: SessionConfig,
    pub auth: AuthConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
    pub static_dir: String,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct LoggingConfig {
    pub json: bool,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct ChatConfig {
    pub welcome_text: String,
    pub reply_text: String,
    pub reply_delay_ms: u64,
    pub reply_overlap: ReplyOverlap,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct UploadConfig {
    pub sink_enabled: bool,
    pub sink_url: String,
    pub field_name: String,
    pub sink_timeout_secs: u64,
    pub progress_interval_ms: u64,
    pub progress_step: u8,
    pub max_file_size: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SessionConfig {
    pub idle_timeout_secs: u64,
    pub sweep_interval_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub session_cookie: String,
    pub sign_in_url: String,
    pub sign_up_url: String,
    pub sign_out_url: String,
}

impl ServerConfig {
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl ChatConfig {
    #[must_use]
    pub fn reply_delay(&self) -> Duration {
        Duration::from_millis(self.reply_delay_ms)
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            welcome_text: DEFAULT_WELCOME_TEXT.to_string(),
            reply_text: DEFAULT_REPLY_TEXT.to_string(),
            reply_delay_ms: 1200,
            reply_overlap: ReplyOverlap::default(),
        }
    }
}

impl UploadConfig {
    #[must_use]
    pub fn progress_interval(&self) -> Duration {
        Duration::from_millis(self.progress_interval_ms)
    }

    #[must_use]
    pub fn sink_timeout(&self) -> Duration {
        Duration::from_secs(self.sink_timeout_secs)
    }

    /// Number of ticks the simulated progress needs to reach 100.
    #[must_use]
    pub fn ticks_to_complete(&self) -> u32 {
        100_u32.div_ceil(u32::from(self.progress_step.max(1)))
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            sink_enabled: true,
            sink_url: "http://localhost:8000".to_string(),
            field_name: "pdf".to_string(),
            sink_timeout_secs: 30,
            progress_interval_ms: 100,
            progress_step: 10,
            max_file_size: 50 * 1024 * 1024,
        }
    }
}

impl SessionConfig {
    #[must_use]
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }

    #[must_use]
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            host: "0.0.0.0".to_string(),
            static_dir: "static".to_string(),
            request_timeout_secs: 30,
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            idle_timeout_secs: 30 * 60,
            sweep_interval_secs: 60,
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_cookie: "__session".to_string(),
            sign_in_url: "/sign-in".to_string(),
            sign_up_url: "/sign-up".to_string(),
            sign_out_url: "/sign-out".to_string(),
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_args(std::env::args())
    }

    pub fn load_from_args<I, T>(args: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let cli = Cli::try_parse_from(args).map_err(|e| ConfigError::Message(e.to_string()))?;

        let defaults = Self::default();

        // 1. Defaults
        let mut builder = Config::builder()
            .set_default("server.port", defaults.server.port)?
            .set_default("server.host", defaults.server.host)?
            .set_default("server.static_dir", defaults.server.static_dir)?
            .set_default("server.request_timeout_secs", defaults.server.request_timeout_secs)?
            .set_default("logging.json", defaults.logging.json)?
            .set_default("chat.welcome_text", defaults.chat.welcome_text)?
            .set_default("chat.reply_text", defaults.chat.reply_text)?
            .set_default("chat.reply_delay_ms", defaults.chat.reply_delay_ms)?
            .set_default("chat.reply_overlap", defaults.chat.reply_overlap.as_str())?
            .set_default("upload.sink_enabled", defaults.upload.sink_enabled)?
            .set_default("upload.sink_url", defaults.upload.sink_url)?
            .set_default("upload.field_name", defaults.upload.field_name)?
            .set_default("upload.sink_timeout_secs", defaults.upload.sink_timeout_secs)?
            .set_default("upload.progress_interval_ms", defaults.upload.progress_interval_ms)?
            .set_default("upload.progress_step", u64::from(defaults.upload.progress_step))?
            .set_default("upload.max_file_size", defaults.upload.max_file_size as u64)?
            .set_default("session.idle_timeout_secs", defaults.session.idle_timeout_secs)?
            .set_default("session.sweep_interval_secs", defaults.session.sweep_interval_secs)?
            .set_default("auth.session_cookie", defaults.auth.session_cookie)?
            .set_default("auth.sign_in_url", defaults.auth.sign_in_url)?
            .set_default("auth.sign_up_url", defaults.auth.sign_up_url)?
            .set_default("auth.sign_out_url", defaults.auth.sign_out_url)?;

        // 2. Config file: explicit path must exist, ./config.* is optional
        builder = match &cli.config {
            Some(path) => builder.add_source(File::with_name(path)),
            None => builder.add_source(File::with_name("config").required(false)),
        };

        // 3. Environment variables, e.g. PDF_ASSISTANT_SERVER__PORT=8000
        builder = builder.add_source(
            Environment::with_prefix("PDF_ASSISTANT")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        // 4. CLI flags (and their env fallbacks) win over everything else
        if let Some(port) = cli.port {
            builder = builder.set_override("server.port", port)?;
        }
        if let Some(url) = cli.sink_url {
            builder = builder.set_override("upload.sink_url", url)?;
        }
        if let Some(overlap) = cli.reply_overlap {
            builder = builder.set_override("chat.reply_overlap", overlap.to_lowercase())?;
        }
        if let Some(json) = cli.log_json {
            builder = builder.set_override("logging.json", json)?;
        }

        let config: Self = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the simulated processes cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let upload = &self.upload;
        if upload.progress_step == 0 || upload.progress_step > 100 {
            return Err(ConfigError::Message(format!(
                "upload.progress_step must be within 1..=100, got {}",
                upload.progress_step
            )));
        }
        if upload.progress_interval_ms == 0 {
            return Err(ConfigError::Message(
                "upload.progress_interval_ms must be greater than zero".to_string(),
            ));
        }
        if self.session.sweep_interval_secs == 0 {
            return Err(ConfigError::Message(
                "session.sweep_interval_secs must be greater than zero".to_string(),
            ));
        }
        if upload.field_name.trim().is_empty() {
            return Err(ConfigError::Message(
                "upload.field_name cannot be empty".to_string(),
            ));
        }
        if self.chat.welcome_text.trim().is_empty() || self.chat.reply_text.trim().is_empty() {
            return Err(ConfigError::Message(
                "chat.welcome_text and chat.reply_text cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}
