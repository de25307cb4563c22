mod chromium;
mod error;

pub use chromium::ChromiumLauncher;
pub use error::{PortalError, Result};

use async_trait::async_trait;
use tokio::time::sleep;
use tracing::{info, warn};

use crate::config::PortalConfig;

// Element ids on the MEO WiFi login form.
pub const USERNAME_FIELD: &str = "user";
pub const PASSWORD_FIELD: &str = "password";
pub const REMEMBER_BOX: &str = "save_credentials";
pub const TERMS_BOX: &str = "conditions";
pub const SUBMIT_BUTTON: &str = "login";

#[async_trait]
pub trait BrowserLauncher: Send + Sync {
    async fn launch(&self) -> Result<Box<dyn PortalPage>>;
}

/// A running browser with at most one page open.
#[async_trait]
pub trait PortalPage: Send {
    async fn goto(&mut self, url: &str) -> Result<()>;

    /// Focuses the element with the given id and types `text` into it.
    async fn fill(&mut self, id: &str, text: &str) -> Result<()>;

    async fn click(&mut self, id: &str) -> Result<()>;

    /// Shuts the browser down. Called exactly once per launched page.
    async fn close(&mut self) -> Result<()>;
}

/// Logs in through the captive portal form. The browser is closed whether or
/// not the form steps succeed; the first step failure is returned.
pub async fn login(launcher: &dyn BrowserLauncher, portal: &PortalConfig) -> Result<()> {
    info!("Launching browser for portal login...");
    let mut page = launcher.launch().await?;

    let result = submit_form(page.as_mut(), portal).await;
    if result.is_ok() {
        info!("Login form submitted, waiting {}s for the portal", portal.settle);
        sleep(portal.settle()).await;
    }

    if let Err(e) = page.close().await {
        warn!("{}", e);
    }

    result
}

async fn submit_form(page: &mut dyn PortalPage, portal: &PortalConfig) -> Result<()> {
    page.goto(&portal.url).await?;

    page.fill(USERNAME_FIELD, &portal.username).await?;
    page.fill(PASSWORD_FIELD, &portal.password).await?;
    page.click(REMEMBER_BOX).await?;
    page.click(TERMS_BOX).await?;
    page.click(SUBMIT_BUTTON).await?;

    Ok(())
}
