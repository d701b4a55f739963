use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::handler::Handler;
use futures::StreamExt;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::CdpConfig;
use crate::error::{AdapterError, AdapterErrorKind};
use crate::page::ChromiumPage;

/// A connected (or launched) browser plus its CDP event loop
pub struct ChromiumBrowser {
    browser: Browser,
    handler_task: JoinHandle<()>,
    launched: bool,
    navigation_timeout: Duration,
}

impl ChromiumBrowser {
    /// Connect or launch according to `cfg.launch`
    pub async fn start(cfg: &CdpConfig) -> Result<Self, AdapterError> {
        cfg.validate()?;
        if cfg.launch {
            Self::launch(cfg).await
        } else {
            Self::connect(cfg).await
        }
    }

    /// Attach to a running Chrome through its remote debugging endpoint
    pub async fn connect(cfg: &CdpConfig) -> Result<Self, AdapterError> {
        info!(url = %cfg.debugger_url, "Connecting to browser");
        let (browser, handler) = Browser::connect(cfg.debugger_url.clone())
            .await
            .map_err(|err| {
                AdapterError::new(AdapterErrorKind::Connect)
                    .with_hint(format!("{}: {}", cfg.debugger_url, err))
            })?;
        Ok(Self::with_handler(browser, handler, false, cfg))
    }

    pub async fn launch(cfg: &CdpConfig) -> Result<Self, AdapterError> {
        let mut builder = BrowserConfig::builder();
        if !cfg.headless {
            builder = builder.with_head();
        }
        if let Some(executable) = cfg.resolve_executable() {
            debug!(executable = %executable.display(), "Using browser executable");
            builder = builder.chrome_executable(executable);
        }
        let config = builder.build().map_err(|err| {
            AdapterError::new(AdapterErrorKind::Launch).with_hint(err.to_string())
        })?;

        info!(headless = cfg.headless, "Launching browser");
        let (browser, handler) = Browser::launch(config).await.map_err(|err| {
            AdapterError::new(AdapterErrorKind::Launch).with_hint(err.to_string())
        })?;
        Ok(Self::with_handler(browser, handler, true, cfg))
    }

    fn with_handler(browser: Browser, mut handler: Handler, launched: bool, cfg: &CdpConfig) -> Self {
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(err) = event {
                    warn!(error = %err, "Browser handler error");
                }
            }
            debug!("Browser handler task ended");
        });
        Self {
            browser,
            handler_task,
            launched,
            navigation_timeout: Duration::from_millis(cfg.navigation_timeout_ms),
        }
    }

    /// First open tab, or a fresh `about:blank` tab when none exists
    pub async fn page(&self) -> Result<ChromiumPage, AdapterError> {
        let existing = self.browser.pages().await.map_err(|err| {
            AdapterError::new(AdapterErrorKind::CdpIo).with_hint(err.to_string())
        })?;
        let page = match existing.into_iter().next() {
            Some(page) => page,
            None => self.browser.new_page("about:blank").await.map_err(|err| {
                AdapterError::new(AdapterErrorKind::PageUnavailable).with_hint(err.to_string())
            })?,
        };
        Ok(ChromiumPage::new(page, self.navigation_timeout))
    }

    /// Close a launched browser; a connected one is only detached from
    pub async fn shutdown(mut self) {
        if self.launched {
            match self.browser.close().await {
                Ok(_) => {
                    if let Err(err) = self.browser.wait().await {
                        warn!(error = %err, "Failed to reap browser process");
                    }
                }
                Err(err) => warn!(error = %err, "Failed to close browser"),
            }
        }
        self.handler_task.abort();
    }
}
