use hohstartup_core::{Error, Result};
use tracing::info;

/// Surfaces the follow-up resource returned by the relay.
pub trait ResultPresenter: Send + Sync {
    fn open_resource(&self, url: &str) -> Result<()>;
}

/// Opens the URL in the system browser.
#[derive(Debug, Default, Clone, Copy)]
pub struct BrowserPresenter;

impl ResultPresenter for BrowserPresenter {
    fn open_resource(&self, url: &str) -> Result<()> {
        info!(url = %url, "Opening result in browser");
        open::that(url).map_err(|e| Error::Presenter(format!("failed to open {}: {}", url, e)))
    }
}

/// Prints the URL to stdout.
#[derive(Debug, Default, Clone, Copy)]
pub struct PrintPresenter;

impl ResultPresenter for PrintPresenter {
    fn open_resource(&self, url: &str) -> Result<()> {
        println!("{}", url);
        Ok(())
    }
}
