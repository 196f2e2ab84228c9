use std::fs;
use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Local;
use fake_user_agent::get_rua;
use thirtyfour::{By, ChromiumLikeCapabilities, DesiredCapabilities, WebDriver, WebElement};
use tokio::time::{sleep, Instant};

use crate::configuration::WebDriverSettings;
use crate::services::error::ScraperError;
use crate::services::scraper::ListingDriver;

const SCREENSHOT_DIR: &str = "screenshots";
const POLL_INTERVAL: Duration = Duration::from_millis(500);
const SETTLE_TIMEOUT: Duration = Duration::from_secs(10);

/// Owns the WebDriver session for one pipeline run. Never shared across
/// runs; `quit` must be called on every exit path.
pub struct Droid {
    pub driver: WebDriver,
}

impl Droid {
    pub async fn new(settings: &WebDriverSettings) -> Result<Self, ScraperError> {
        let mut caps = DesiredCapabilities::chrome();
        caps.add_arg("--no-sandbox")?;
        caps.add_arg("--disable-setuid-sandbox")?;
        caps.add_arg("--disable-infobars")?;
        caps.add_arg("--window-position=0,0")?;
        caps.add_arg("--ignore-certificate-errors")?;
        caps.add_arg(&format!("--user-agent={}", get_rua()))?;
        if settings.headless {
            caps.add_arg("--headless=new")?;
        }

        let driver = WebDriver::new(&settings.url, caps).await?;
        driver.maximize_window().await?;

        Ok(Droid { driver })
    }

    pub async fn quit(self) {
        if let Err(e) = self.driver.quit().await {
            log::error!("Failed to close the browser session: {:?}", e);
        }
    }

    /// Best-effort screenshot of the current page state, taken before the
    /// session is torn down on a failed run. Never raises.
    pub async fn capture_failure_state(&self) {
        if let Err(e) = fs::create_dir_all(SCREENSHOT_DIR) {
            log::error!("Failed to create screenshot directory: {:?}", e);
            return;
        }

        let timestamp = Local::now().format("%Y-%m-%dT%H-%M-%S");
        let path = Path::new(SCREENSHOT_DIR).join(format!("error_screenshot_{}.png", timestamp));

        match self.driver.screenshot(&path).await {
            Ok(()) => log::info!("Screenshot taken: {}", path.display()),
            Err(e) => log::error!("Failed to capture failure screenshot: {:?}", e),
        }
    }
}

/// Polls for an element until it appears. With `timeout: None` this blocks
/// indefinitely when the element never renders; the Capterra search flow
/// relies on that and it is a known limitation, kept as-is.
pub async fn wait_for_element(
    driver: &WebDriver,
    by: By,
    timeout: Option<Duration>,
) -> Result<WebElement, ScraperError> {
    let deadline = timeout.map(|t| Instant::now() + t);

    loop {
        if let Ok(element) = driver.find(by.clone()).await {
            return Ok(element);
        }
        if let Some(deadline) = deadline {
            if Instant::now() >= deadline {
                return Err(ScraperError::Extraction(format!(
                    "Timed out waiting for selector: {}",
                    by
                )));
            }
        }
        sleep(POLL_INTERVAL).await;
    }
}

#[async_trait]
impl ListingDriver for Droid {
    async fn current_source(&self) -> Result<String, ScraperError> {
        Ok(self.driver.source().await?)
    }

    async fn click_matching(&self, css: &str) -> Result<bool, ScraperError> {
        match self.driver.find(By::Css(css)).await {
            Ok(element) => {
                element.click().await?;
                Ok(true)
            }
            Err(_) => Ok(false),
        }
    }

    async fn wait_settled(&self, previous_source: &str) -> Result<(), ScraperError> {
        // Poll until the page source differs from the pre-click snapshot, so
        // a slow transition is never re-read as the old page. Bounded: a
        // transition that never changes the source proceeds with a warning
        // rather than blocking the run.
        let deadline = Instant::now() + SETTLE_TIMEOUT;

        loop {
            sleep(POLL_INTERVAL).await;
            if self.driver.source().await? != previous_source {
                return Ok(());
            }
            if Instant::now() >= deadline {
                log::warn!(
                    "Page source unchanged {:?} after triggering the next page",
                    SETTLE_TIMEOUT
                );
                return Ok(());
            }
        }
    }
}
