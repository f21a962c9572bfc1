use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

use leadbot_core::{Playbook, SendFailurePolicy};

#[derive(Debug, Default, Deserialize, Serialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub whatsapp: WhatsAppConfig,
    #[serde(default)]
    pub conversation: ConversationConfig,
    #[serde(default)]
    pub playbook: Playbook,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "ServerConfig::default_host")]
    pub host: String,
    #[serde(default = "ServerConfig::default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: Self::default_host(),
            port: Self::default_port(),
        }
    }
}

impl ServerConfig {
    fn default_host() -> String {
        "0.0.0.0".to_string()
    }

    const fn default_port() -> u16 {
        3000
    }

    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// The only WhatsApp connection mode this build serves.
pub const CLOUD_MODE: &str = "cloud";

/// WhatsApp Cloud API credentials and webhook behavior.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct WhatsAppConfig {
    /// Transport selector; only `cloud` is supported.
    #[serde(default = "WhatsAppConfig::default_connection_mode")]
    pub connection_mode: String,
    /// Token echoed back during the webhook subscription handshake.
    #[serde(default)]
    pub verify_token: String,
    #[serde(default)]
    pub access_token: String,
    #[serde(default)]
    pub phone_number_id: String,
    /// App secret for `X-Hub-Signature-256` checks; empty disables them.
    #[serde(default)]
    pub app_secret: String,
    #[serde(default = "WhatsAppConfig::default_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "WhatsAppConfig::default_api_version")]
    pub api_version: String,
    /// Drop webhook messages sent before the process started.
    #[serde(default)]
    pub skip_backlog: bool,
    /// Delays between send attempts; one attempt more than entries.
    #[serde(default = "WhatsAppConfig::default_retry_delays_secs")]
    pub retry_delays_secs: Vec<u64>,
}

impl Default for WhatsAppConfig {
    fn default() -> Self {
        Self {
            connection_mode: Self::default_connection_mode(),
            verify_token: String::new(),
            access_token: String::new(),
            phone_number_id: String::new(),
            app_secret: String::new(),
            api_base_url: Self::default_api_base_url(),
            api_version: Self::default_api_version(),
            skip_backlog: false,
            retry_delays_secs: Self::default_retry_delays_secs(),
        }
    }
}

impl WhatsAppConfig {
    fn default_connection_mode() -> String {
        CLOUD_MODE.to_string()
    }

    fn default_api_base_url() -> String {
        "https://graph.facebook.com".to_string()
    }

    fn default_api_version() -> String {
        "v21.0".to_string()
    }

    fn default_retry_delays_secs() -> Vec<u64> {
        vec![1, 2, 4]
    }

    /// Names of the settings the cloud transport cannot run without.
    #[must_use]
    pub fn missing_cloud_fields(&self) -> Vec<&'static str> {
        [
            ("verify_token", &self.verify_token),
            ("access_token", &self.access_token),
            ("phone_number_id", &self.phone_number_id),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect()
    }
}

#[derive(Debug, Default, Deserialize, Serialize, Clone)]
pub struct ConversationConfig {
    #[serde(default)]
    pub send_failure: SendFailurePolicy,
}

impl Config {
    pub fn config_dir() -> anyhow::Result<PathBuf> {
        Ok(dirs::home_dir()
            .ok_or_else(|| anyhow::anyhow!("Cannot find home directory"))?
            .join("leadbot"))
    }

    pub fn default_path() -> anyhow::Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.json"))
    }

    /// Load `~/leadbot/config.json`, or `path` when given, then apply
    /// environment overrides.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::default_path()?,
        };

        if !config_path.exists() {
            anyhow::bail!(
                "Config file not found at: {}. Please run 'leadbot init' to create config.",
                config_path.display()
            );
        }

        let mut config = Self::from_file(&config_path)?;
        config.apply_env();
        config.validate()?;
        info!("Loaded config from {}", config_path.display());
        Ok(config)
    }

    /// Like [`Config::load`], but a missing file yields the defaults.
    pub fn load_or_default(path: Option<&Path>) -> anyhow::Result<Self> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::default_path()?,
        };

        if config_path.exists() {
            return Self::load(Some(&config_path));
        }

        info!(
            "No config at {}, using built-in defaults",
            config_path.display()
        );
        let mut config = Self::default();
        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Invalid config file {}: {e}", path.display()))?;
        Ok(config)
    }

    pub fn apply_env(&mut self) {
        self.apply_env_from(|key| std::env::var(key).ok());
    }

    /// Override settings from `PORT` and the `WHATSAPP_*` variables.
    pub fn apply_env_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(port) = lookup("PORT").and_then(|p| p.trim().parse().ok()) {
            self.server.port = port;
        }
        if let Some(v) = lookup("WHATSAPP_CONNECTION_MODE") {
            self.whatsapp.connection_mode = v.trim().to_lowercase();
        }
        if let Some(v) = lookup("WHATSAPP_VERIFY_TOKEN") {
            self.whatsapp.verify_token = v;
        }
        if let Some(v) = lookup("WHATSAPP_ACCESS_TOKEN") {
            self.whatsapp.access_token = v;
        }
        if let Some(v) = lookup("WHATSAPP_PHONE_NUMBER_ID") {
            self.whatsapp.phone_number_id = v;
        }
        if let Some(v) = lookup("WHATSAPP_APP_SECRET") {
            self.whatsapp.app_secret = v;
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        self.playbook
            .validate()
            .map_err(|e| anyhow::anyhow!("Invalid playbook: {e}"))
    }

    /// Fail unless every setting the webhook transport needs is present.
    pub fn validate_cloud(&self) -> anyhow::Result<()> {
        match self.whatsapp.connection_mode.as_str() {
            CLOUD_MODE => {}
            "qrcode" => anyhow::bail!(
                "WhatsApp connection mode 'qrcode' is not supported; set WHATSAPP_CONNECTION_MODE=cloud"
            ),
            other => anyhow::bail!(
                "Unknown WhatsApp connection mode '{other}'; the only supported mode is 'cloud'"
            ),
        }

        let missing = self.whatsapp.missing_cloud_fields();
        if !missing.is_empty() {
            anyhow::bail!(
                "Missing WhatsApp settings for cloud mode: {}. Set them in config or via WHATSAPP_* env vars",
                missing.join(", ")
            );
        }
        Ok(())
    }

    fn template() -> Self {
        let mut config = Self::default();
        config.whatsapp.verify_token = "choose-a-verify-token".to_string();
        config.whatsapp.access_token = "your-whatsapp-access-token".to_string();
        config.whatsapp.phone_number_id = "your-phone-number-id".to_string();
        config
    }

    pub fn create_config() -> anyhow::Result<PathBuf> {
        let config_dir = Self::config_dir()?;
        std::fs::create_dir_all(&config_dir)?;
        let config_path = config_dir.join("config.json");
        Self::write_template(&config_path)?;

        println!("✅ Created config file at: {}", config_path.display());
        println!();
        println!("📝 Next steps:");
        println!("   1. Fill in whatsapp.access_token and whatsapp.phone_number_id");
        println!("   2. Pick a whatsapp.verify_token and register the webhook with it");
        println!("   3. Run 'leadbot serve' to start the webhook server");
        println!();
        println!("🔧 Configuration options:");
        println!("   - playbook: greeting, purposes and replies sent to contacts");
        println!("   - conversation.send_failure: \"commit\" or \"rollback\"");
        println!("   - whatsapp.skip_backlog: ignore messages sent before startup");
        println!();
        Ok(config_path)
    }

    pub fn write_template(config_path: &Path) -> anyhow::Result<()> {
        if config_path.exists() {
            anyhow::bail!(
                "Config file already exists at: {}. Please edit it directly.",
                config_path.display()
            );
        }

        let content = serde_json::to_string_pretty(&Self::template())?;
        std::fs::write(config_path, content)?;
        Ok(())
    }
}
