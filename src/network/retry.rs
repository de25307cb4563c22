use tokio::time::sleep;
use tracing::{debug, error, info};

use super::{connect_to_network, is_connected, NetworkManager};
use crate::config::NetworkConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryState {
    Checking,
    Connecting,
    Succeeded,
    Exhausted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryOutcome {
    /// Terminal state, either `Succeeded` or `Exhausted`.
    pub state: RetryState,
    /// Number of connect attempts made.
    pub attempts: u32,
}

/// Re-checks association and reconnects until associated or the configured
/// attempts are used up. The check runs before every attempt, so zero
/// attempts only checks once.
pub async fn reconnect(manager: &dyn NetworkManager, network: &NetworkConfig) -> RetryOutcome {
    let max = network.retry.attempts;
    let mut attempts = 0;
    let mut state = RetryState::Checking;

    loop {
        state = match state {
            RetryState::Checking => {
                if is_connected(manager, &network.ssid).await {
                    RetryState::Succeeded
                } else if attempts < max {
                    RetryState::Connecting
                } else {
                    RetryState::Exhausted
                }
            }
            RetryState::Connecting => {
                debug!("Connect attempt {}/{}", attempts + 1, max);
                connect_to_network(manager, network).await;
                sleep(network.retry.interval()).await;
                attempts += 1;
                RetryState::Checking
            }
            RetryState::Succeeded => {
                info!("Successfully connected to the network.");
                return RetryOutcome { state, attempts };
            }
            RetryState::Exhausted => {
                error!(
                    "Failed to connect to the network after {} attempts.",
                    attempts
                );
                return RetryOutcome { state, attempts };
            }
        };
    }
}
