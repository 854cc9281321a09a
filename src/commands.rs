//! Async commands pattern for side effects.
//!
//! Commands represent async operations that run outside the main event loop.
//! The controller returns commands, the App spawns them, and each command
//! reports its result back to the controller through a channel.

mod articles;
mod session;

use async_trait::async_trait;
use color_eyre::Result;

pub use articles::{CreateArticleCmd, DeleteArticleCmd, FetchArticlesCmd, UpdateArticleCmd};
pub use session::LoginCmd;

/// Async commands that perform side effects.
///
/// API failures are not errors at this level: they are reported to the
/// controller as messages. `execute` only fails when the result cannot be
/// delivered.
#[async_trait]
pub trait Command: Send + 'static {
    /// Human-readable name for logging and error display.
    fn name(&self) -> String;

    /// Execute the command.
    async fn execute(self: Box<Self>) -> Result<()>;
}
