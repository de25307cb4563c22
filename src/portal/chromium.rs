use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig as LaunchConfig};
use chromiumoxide::element::Element;
use chromiumoxide::Page;
use futures::StreamExt;
use std::path::PathBuf;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use super::error::{PortalError, Result};
use super::{BrowserLauncher, PortalPage};
use crate::config::BrowserConfig;

/// Launches the configured Chromium binary over the DevTools protocol.
pub struct ChromiumLauncher {
    executable: PathBuf,
    headless: bool,
}

impl ChromiumLauncher {
    pub fn new(executable: impl Into<PathBuf>, headless: bool) -> Self {
        Self {
            executable: executable.into(),
            headless,
        }
    }

    pub fn from_config(config: &BrowserConfig) -> Self {
        Self::new(config.path.clone(), config.headless)
    }
}

#[async_trait]
impl BrowserLauncher for ChromiumLauncher {
    async fn launch(&self) -> Result<Box<dyn PortalPage>> {
        let mut builder = LaunchConfig::builder().chrome_executable(&self.executable);
        if !self.headless {
            builder = builder.with_head();
        }
        let launch_config = builder.build().map_err(PortalError::Launch)?;

        let (browser, mut handler) = Browser::launch(launch_config)
            .await
            .map_err(|e| PortalError::Launch(format!("{}: {}", self.executable.display(), e)))?;

        // The CDP connection only makes progress while its handler is polled.
        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!("Browser event error: {}", e);
                }
            }
        });

        info!("Browser started from {}", self.executable.display());

        Ok(Box::new(ChromiumPage {
            browser,
            page: None,
            handler: Some(handler),
        }))
    }
}

/// Dropping this without `close` still kills the browser process, since
/// `Browser` kills its child on drop.
struct ChromiumPage {
    browser: Browser,
    page: Option<Page>,
    handler: Option<JoinHandle<()>>,
}

impl ChromiumPage {
    async fn element(&self, id: &str) -> Result<Element> {
        let page = self.page.as_ref().ok_or_else(|| PortalError::ElementNotFound {
            id: id.to_string(),
            reason: "no page open".to_string(),
        })?;

        page.find_element(format!("#{id}"))
            .await
            .map_err(|e| PortalError::ElementNotFound {
                id: id.to_string(),
                reason: e.to_string(),
            })
    }
}

fn interaction(id: &str, e: chromiumoxide::error::CdpError) -> PortalError {
    PortalError::Interaction {
        id: id.to_string(),
        reason: e.to_string(),
    }
}

#[async_trait]
impl PortalPage for ChromiumPage {
    async fn goto(&mut self, url: &str) -> Result<()> {
        let navigation = |e: chromiumoxide::error::CdpError| PortalError::Navigation {
            url: url.to_string(),
            reason: e.to_string(),
        };

        let page = self.browser.new_page(url).await.map_err(navigation)?;
        page.wait_for_navigation().await.map_err(navigation)?;
        debug!("Opened {}", url);

        self.page = Some(page);
        Ok(())
    }

    async fn fill(&mut self, id: &str, text: &str) -> Result<()> {
        let element = self.element(id).await?;
        element.click().await.map_err(|e| interaction(id, e))?;
        element.type_str(text).await.map_err(|e| interaction(id, e))?;
        Ok(())
    }

    async fn click(&mut self, id: &str) -> Result<()> {
        let element = self.element(id).await?;
        element.click().await.map_err(|e| interaction(id, e))?;
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        self.page = None;

        let closed = self.browser.close().await;
        if closed.is_ok() {
            if let Err(e) = self.browser.wait().await {
                debug!("Failed to reap browser process: {}", e);
            }
        }

        if let Some(handler) = self.handler.take() {
            if closed.is_ok() {
                let _ = handler.await;
            } else {
                handler.abort();
            }
        }

        closed.map(|_| ()).map_err(|e| PortalError::Close(e.to_string()))?;
        info!("Browser closed");
        Ok(())
    }
}
