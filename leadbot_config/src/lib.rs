mod schema;

pub use schema::{Config, ConversationConfig, ServerConfig, WhatsAppConfig};
