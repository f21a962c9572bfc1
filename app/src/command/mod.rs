//! Static strategy pattern for CLI commands.
//!
//! Each command is a separate strategy type with its own input type, so
//! dispatch from `main` is fully static.

use leadbot_config::Config;
use leadbot_conversation::IntakeEngine;
use leadbot_core::{MessageSender, SessionStore};
use leadbot_session::InMemorySessionStore;
use std::sync::Arc;
use tracing::info;

mod info;
mod init;
mod serve;
mod simulate;
mod version;

pub use info::InfoStrategy;
pub use init::InitStrategy;
pub use serve::{ServeInput, ServeStrategy};
pub use simulate::{SimulateInput, SimulateStrategy};
pub use version::VersionStrategy;

/// Wire the engine to a fresh in-memory store and the given sender.
fn build_engine(config: &Config, sender: Arc<dyn MessageSender>) -> Arc<IntakeEngine> {
    let store: Arc<dyn SessionStore> = Arc::new(InMemorySessionStore::new());

    info!(
        "Send failure policy: {:?}",
        config.conversation.send_failure
    );

    Arc::new(
        IntakeEngine::new(Arc::new(config.playbook.clone()), store, sender)
            .with_send_failure_policy(config.conversation.send_failure),
    )
}

/// Core trait defining the contract for all command strategies.
///
/// # Example
/// ```ignore
/// struct MyStrategy;
///
/// impl CommandStrategy for MyStrategy {
///     type Input = MyInput;
///
///     async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
///         // Command logic here
///         Ok(())
///     }
/// }
/// ```
pub trait CommandStrategy: Send + Sync + 'static {
    /// The input type this strategy accepts.
    type Input;

    /// Execute the command with the given input.
    ///
    /// # Errors
    /// Returns an error if command execution fails.
    async fn execute(&self, input: Self::Input) -> anyhow::Result<()>;
}
