use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use super::{NetworkError, NetworkManager};

/// NetworkManager's command-line client.
pub struct Nmcli {
    program: String,
}

impl Nmcli {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    async fn run(&self, args: &[&str]) -> Result<String, NetworkError> {
        debug!("Running {} {}", self.program, args.join(" "));

        let output = Command::new(&self.program)
            .args(args)
            .output()
            .await
            .map_err(|source| NetworkError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(NetworkError::Exit {
                program: self.program.clone(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[async_trait]
impl NetworkManager for Nmcli {
    async fn list_wifi(&self) -> Result<String, NetworkError> {
        self.run(&["-t", "-f", "active,ssid", "dev", "wifi"]).await
    }

    async fn connect(&self, ssid: &str, device: &str) -> Result<(), NetworkError> {
        self.run(&["dev", "wifi", "connect", ssid, "ifname", device])
            .await
            .map(|_| ())
    }
}
