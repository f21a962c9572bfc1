use leadbot_config::Config;
use std::path::PathBuf;

/// Strategy for displaying configuration information.
///
/// Prints server settings, WhatsApp credentials (masked), the send failure
/// policy and the purpose catalog.
#[derive(Debug, Clone, Copy)]
pub struct InfoStrategy;

impl super::CommandStrategy for InfoStrategy {
    type Input = Option<PathBuf>;

    async fn execute(&self, config_path: Self::Input) -> anyhow::Result<()> {
        let config = Config::load_or_default(config_path.as_deref())?;

        println!("=== leadbot Configuration ===\n");

        println!("Server:");
        println!("  Bind: {}", config.server.bind_address());
        println!();

        let whatsapp = &config.whatsapp;
        println!("WhatsApp Cloud API:");
        println!("  Connection Mode: {}", whatsapp.connection_mode);
        println!("  Messages URL: {}/{}/{}/messages", whatsapp.api_base_url, whatsapp.api_version, whatsapp.phone_number_id);
        println!("  Access Token: {}", mask_secret(&whatsapp.access_token));
        println!("  Verify Token: {}", mask_secret(&whatsapp.verify_token));
        println!("  App Secret: {}", mask_secret(&whatsapp.app_secret));
        println!("  Skip Backlog: {}", whatsapp.skip_backlog);
        println!("  Retry Delays: {:?}s", whatsapp.retry_delays_secs);
        let missing = whatsapp.missing_cloud_fields();
        if missing.is_empty() {
            println!("  Status: ready");
        } else {
            println!("  Status: missing {}", missing.join(", "));
        }
        println!();

        println!("Conversation:");
        println!("  Send Failure Policy: {:?}", config.conversation.send_failure);
        println!();

        println!("Purposes:");
        for purpose in &config.playbook.purposes {
            println!("  {} -> {}", purpose.code, purpose.label);
        }

        Ok(())
    }
}

fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.is_empty() {
        "(not set)".to_string()
    } else if chars.len() > 8 {
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{head}...{tail}")
    } else {
        "***".to_string()
    }
}
