use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, error};

use crate::config::ProbeConfig;

/// Result of a single reachability probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    Reachable,
    ConnectionFailed(String),
    TimedOut(String),
    Failed(String),
}

impl ProbeOutcome {
    pub fn is_reachable(&self) -> bool {
        matches!(self, ProbeOutcome::Reachable)
    }
}

#[async_trait]
pub trait ConnectivityProbe: Send + Sync {
    async fn probe(&self) -> ProbeOutcome;
}

/// Infers internet reachability from one GET request. Any HTTP response
/// counts as reachable; no retries happen here.
pub struct HttpProbe {
    client: Client,
    url: String,
}

impl HttpProbe {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }

    pub fn from_config(config: &ProbeConfig) -> Result<Self, reqwest::Error> {
        Self::new(config.url.clone(), config.timeout())
    }
}

#[async_trait]
impl ConnectivityProbe for HttpProbe {
    async fn probe(&self) -> ProbeOutcome {
        debug!("Probing internet connectivity via {}", self.url);

        match self.client.get(&self.url).send().await {
            Ok(response) => {
                debug!("Probe answered with status {}", response.status());
                ProbeOutcome::Reachable
            }
            // Connect timeouts set both flags, so timeout wins.
            Err(e) if e.is_timeout() => {
                error!("Connection timed out: {}", e);
                ProbeOutcome::TimedOut(e.to_string())
            }
            Err(e) if e.is_connect() => {
                error!("Error connecting to the internet: {}", e);
                ProbeOutcome::ConnectionFailed(e.to_string())
            }
            Err(e) => {
                error!("Connectivity probe failed: {}", e);
                ProbeOutcome::Failed(e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn refused_connection_is_not_reachable() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let probe = HttpProbe::new(format!("http://{addr}/"), Duration::from_secs(2)).unwrap();
        let outcome = probe.probe().await;

        assert!(matches!(outcome, ProbeOutcome::ConnectionFailed(_)), "{outcome:?}");
        assert!(!outcome.is_reachable());
    }

    #[tokio::test]
    async fn silent_server_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (_socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(30)).await;
        });

        let probe = HttpProbe::new(format!("http://{addr}/"), Duration::from_millis(200)).unwrap();
        let outcome = probe.probe().await;

        assert!(matches!(outcome, ProbeOutcome::TimedOut(_)), "{outcome:?}");
        assert!(!outcome.is_reachable());
    }

    #[tokio::test]
    async fn any_http_response_is_reachable() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 1024];
            let _ = socket.read(&mut buf).await;
            socket
                .write_all(b"HTTP/1.1 302 Found\r\nLocation: http://portal/\r\nContent-Length: 0\r\n\r\n")
                .await
                .unwrap();
        });

        let client = HttpProbe {
            client: Client::builder()
                .timeout(Duration::from_secs(2))
                .redirect(reqwest::redirect::Policy::none())
                .build()
                .unwrap(),
            url: format!("http://{addr}/"),
        };

        assert_eq!(client.probe().await, ProbeOutcome::Reachable);
    }
}
