use thirtyfour::error::WebDriverError;

/// Failure taxonomy for one scrape run. Validation errors are raised before
/// any navigation happens; traversal errors are absorbed into partial
/// results (Capterra) or escalated (G2) depending on the strategy.
#[derive(Debug, thiserror::Error)]
pub enum ScraperError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Unknown review source: {0}. Supported sources are 'g2' and 'capterra'.")]
    UnknownSource(String),

    #[error("No results found for the company name: {0}")]
    CompanyNotFound(String),

    #[error("Error while scraping reviews: {0}")]
    Extraction(String),

    #[error("Error during navigation and scraping: {0}")]
    Navigation(#[from] WebDriverError),
}
