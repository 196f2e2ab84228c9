use async_trait::async_trait;
use chrono::NaiveDate;
use thirtyfour::WebDriver;

use crate::domain::dates::parse_iso_date;
use crate::domain::{Review, ReviewSource, ScrapeQuery};
use crate::services::capterra_scraper::CapterraScraper;
use crate::services::error::ScraperError;
use crate::services::g2_scraper::G2Scraper;

/// The per-source capabilities the shared traversal loop is parameterized
/// over. Page extraction is pure (it takes already-retrieved markup), so the
/// parsing rules are testable without a browser.
#[async_trait]
pub trait ReviewScraper: Send + Sync {
    fn query(&self) -> &ScrapeQuery;

    /// Searches the marketplace home page for the company name and returns
    /// the slug of the first result.
    async fn resolve_company(&self, driver: &WebDriver) -> Result<String, ScraperError>;

    fn reviews_url(&self, slug: &str) -> String;

    /// Waits for the review listing surface to render after navigation.
    async fn await_listing(&self, driver: &WebDriver) -> Result<(), ScraperError>;

    /// Maps every review card in the page markup to a record, keeping only
    /// those whose parsed date falls inside the query window.
    fn extract_page(&self, html: &str, today: NaiveDate) -> Vec<Review>;

    /// CSS selector of the "next page" affordance.
    fn next_page_selector(&self) -> &'static str;

    /// Whether a mid-traversal error ends the whole run (G2) or stops the
    /// loop keeping the records collected so far (Capterra).
    fn halts_on_error(&self) -> bool;
}

/// The slice of the rendering session the traversal loop needs. `Droid`
/// implements it over a live WebDriver; tests implement it over canned page
/// sources.
#[async_trait]
pub trait ListingDriver: Send + Sync {
    async fn current_source(&self) -> Result<String, ScraperError>;

    /// Clicks the first element matching `css`. Returns false when no such
    /// element is present.
    async fn click_matching(&self, css: &str) -> Result<bool, ScraperError>;

    /// Suspends until a triggered page transition has rendered, given the
    /// page source as it was before the click. Extracting before the new
    /// content settles yields stale or empty results.
    async fn wait_settled(&self, previous_source: &str) -> Result<(), ScraperError>;
}

pub struct ScraperFactory;

impl ScraperFactory {
    /// Validates the raw query fields and constructs the strategy for the
    /// requested source. Pure; no navigation happens here.
    pub fn get_scraper(
        source: &str,
        company_name: &str,
        start_date: &str,
        end_date: &str,
    ) -> Result<Box<dyn ReviewScraper>, ScraperError> {
        let query = Self::validate_inputs(source, company_name, start_date, end_date)?;

        match query.source {
            ReviewSource::G2 => Ok(Box::new(G2Scraper::new(query))),
            ReviewSource::Capterra => Ok(Box::new(CapterraScraper::new(query))),
        }
    }

    fn validate_inputs(
        source: &str,
        company_name: &str,
        start_date: &str,
        end_date: &str,
    ) -> Result<ScrapeQuery, ScraperError> {
        if company_name.trim().is_empty() {
            return Err(ScraperError::InvalidInput(
                "Company name must be provided.".to_string(),
            ));
        }

        let start = parse_iso_date(start_date).ok_or_else(|| {
            ScraperError::InvalidInput(format!(
                "Invalid start date format: {}. Please use \"YYYY-MM-DD\".",
                start_date
            ))
        })?;
        let end = parse_iso_date(end_date).ok_or_else(|| {
            ScraperError::InvalidInput(format!(
                "Invalid end date format: {}. Please use \"YYYY-MM-DD\".",
                end_date
            ))
        })?;

        if start > end {
            return Err(ScraperError::InvalidInput(format!(
                "Start date {} is after end date {}.",
                start_date, end_date
            )));
        }

        let source = match source.to_lowercase().as_str() {
            "g2" => ReviewSource::G2,
            "capterra" => ReviewSource::Capterra,
            other => return Err(ScraperError::UnknownSource(other.to_string())),
        };

        Ok(ScrapeQuery {
            company_name: company_name.to_string(),
            start_date: start,
            end_date: end,
            source,
        })
    }
}
