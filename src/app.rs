use tracing::{error, info};

use crate::config::Config;
use crate::network::{self, NetworkManager, RetryOutcome, RetryState};
use crate::portal::{self, BrowserLauncher};
use crate::probe::ConnectivityProbe;

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    AlreadyOnline,
    Exhausted(RetryOutcome),
    LoggedIn(RetryOutcome),
    LoginFailed(RetryOutcome),
}

pub struct Reconnector<'a> {
    config: &'a Config,
    probe: &'a dyn ConnectivityProbe,
    manager: &'a dyn NetworkManager,
    launcher: &'a dyn BrowserLauncher,
}

impl<'a> Reconnector<'a> {
    pub fn new(
        config: &'a Config,
        probe: &'a dyn ConnectivityProbe,
        manager: &'a dyn NetworkManager,
        launcher: &'a dyn BrowserLauncher,
    ) -> Self {
        Self {
            config,
            probe,
            manager,
            launcher,
        }
    }

    pub async fn run(&self) -> RunOutcome {
        if self.probe.probe().await.is_reachable() {
            info!("Connected to the internet. Nothing to do!");
            return RunOutcome::AlreadyOnline;
        }

        error!("Not connected to the internet");

        let retry = network::reconnect(self.manager, &self.config.network).await;
        if retry.state != RetryState::Succeeded {
            return RunOutcome::Exhausted(retry);
        }

        info!("Connected to the network. Logging in to MEO WiFi...");
        match portal::login(self.launcher, &self.config.meowifi).await {
            Ok(()) => {
                info!("Portal login completed");
                RunOutcome::LoggedIn(retry)
            }
            Err(e) => {
                error!("Error during login: {}", e);
                RunOutcome::LoginFailed(retry)
            }
        }
    }
}
