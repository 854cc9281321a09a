use std::sync::Arc;

use async_trait::async_trait;
use color_eyre::Result;
use tokio::sync::mpsc::UnboundedSender;

use crate::api::{ArticlesApi, Credentials};
use crate::commands::Command;
use crate::controller::{ControllerMsg, Operation};

/// Exchange credentials for a session token.
pub struct LoginCmd {
    api: Arc<dyn ArticlesApi>,
    credentials: Credentials,
    tx: UnboundedSender<ControllerMsg>,
}

impl LoginCmd {
    pub fn new(
        api: Arc<dyn ArticlesApi>,
        credentials: Credentials,
        tx: UnboundedSender<ControllerMsg>,
    ) -> Self {
        Self {
            api,
            credentials,
            tx,
        }
    }
}

#[async_trait]
impl Command for LoginCmd {
    fn name(&self) -> String {
        format!("Signing in as {}", self.credentials.username)
    }

    async fn execute(self: Box<Self>) -> Result<()> {
        let msg = match self.api.login(&self.credentials).await {
            Ok(response) => ControllerMsg::LoggedIn(response),
            Err(error) => ControllerMsg::RequestFailed {
                operation: Operation::Login,
                sent_with: None,
                error,
            },
        };
        self.tx.send(msg)?;
        Ok(())
    }
}
