mod nmcli;
mod retry;

pub use nmcli::Nmcli;
pub use retry::{reconnect, RetryOutcome, RetryState};

#[cfg(test)]
pub(crate) use retry::tests::FakeManager;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, error, info};

use crate::config::NetworkConfig;

#[derive(Error, Debug)]
pub enum NetworkError {
    #[error("Failed to run {program}: {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },

    #[error("{program} exited with {status}: {stderr}")]
    Exit {
        program: String,
        status: std::process::ExitStatus,
        stderr: String,
    },
}

/// The two network manager operations this program needs.
#[async_trait]
pub trait NetworkManager: Send + Sync {
    /// Raw terse listing of `active:ssid` rows for visible wifi networks.
    async fn list_wifi(&self) -> Result<String, NetworkError>;

    async fn connect(&self, ssid: &str, device: &str) -> Result<(), NetworkError>;
}

/// True iff the manager reports the configured SSID as active. Any failure
/// to query counts as not connected.
pub async fn is_connected(manager: &dyn NetworkManager, ssid: &str) -> bool {
    match manager.list_wifi().await {
        Ok(listing) => is_associated(&listing, ssid),
        Err(e) => {
            error!("Error checking connection status: {}", e);
            false
        }
    }
}

/// Asks the manager to join the configured network. Failures are logged only;
/// callers re-check association instead of trusting this.
pub async fn connect_to_network(manager: &dyn NetworkManager, network: &NetworkConfig) {
    info!("Attempting to connect to {} on {}...", network.ssid, network.device);

    match manager.connect(&network.ssid, &network.device).await {
        Ok(()) => info!("Successfully connected to {}!", network.ssid),
        Err(e) => error!("Error connecting to network: {}", e),
    }
}

pub fn is_associated(listing: &str, ssid: &str) -> bool {
    listing.lines().any(|line| {
        if line.trim().is_empty() {
            return false;
        }

        match split_row(line) {
            Some((active, name)) => active == "yes" && name == ssid,
            None => {
                debug!("Skipping malformed nmcli row: {:?}", line);
                false
            }
        }
    })
}

/// Splits a terse `active:ssid` row on the first unescaped colon and unescapes
/// the SSID (`\:` and `\\`).
fn split_row(line: &str) -> Option<(&str, String)> {
    let mut escaped = false;
    let split_at = line.char_indices().find_map(|(i, c)| {
        match c {
            '\\' if !escaped => escaped = true,
            ':' if !escaped => return Some(i),
            _ => escaped = false,
        }
        None
    })?;

    let (active, rest) = (&line[..split_at], &line[split_at + 1..]);

    let mut ssid = String::with_capacity(rest.len());
    let mut chars = rest.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.next() {
                ssid.push(next);
                continue;
            }
        }
        ssid.push(c);
    }

    Some((active, ssid))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn active_matching_row_is_associated() {
        assert!(is_associated("no:Neighbour\nyes:MEO-WiFi\n", "MEO-WiFi"));
    }

    #[test]
    fn inactive_matching_row_is_not_associated() {
        assert!(!is_associated("no:MEO-WiFi\nyes:Neighbour\n", "MEO-WiFi"));
    }

    #[test]
    fn blank_lines_are_skipped() {
        assert!(!is_associated("\n   \n", "MEO-WiFi"));
        assert!(is_associated("\nno:Other\n\nyes:MEO-WiFi\n\n", "MEO-WiFi"));
    }

    #[test]
    fn empty_listing_is_not_associated() {
        assert!(!is_associated("", "MEO-WiFi"));
    }

    #[test]
    fn rows_without_separator_are_skipped() {
        assert!(!is_associated("garbage\nyes\n", "MEO-WiFi"));
        assert!(is_associated("garbage\nyes:MEO-WiFi", "MEO-WiFi"));
    }

    #[test]
    fn ssid_match_is_exact() {
        assert!(!is_associated("yes:MEO-WiFi-5G\n", "MEO-WiFi"));
        assert!(!is_associated("yes:meo-wifi\n", "MEO-WiFi"));
    }

    #[test]
    fn escaped_colons_in_ssid_are_unescaped() {
        assert!(is_associated(r"yes:Cafe\:Guest", "Cafe:Guest"));
        assert!(is_associated(r"yes:back\\slash", r"back\slash"));
        assert!(!is_associated(r"yes:Cafe\:Guest", "Cafe"));
    }

    #[test]
    fn split_row_handles_empty_ssid() {
        assert_eq!(split_row("yes:"), Some(("yes", String::new())));
        assert_eq!(split_row("no"), None);
    }
}
