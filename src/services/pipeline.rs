use chrono::{Local, NaiveDate};
use tokio_util::sync::CancellationToken;

use crate::configuration::Settings;
use crate::domain::Review;
use crate::services::data_persistance::store_reviews;
use crate::services::droid::Droid;
use crate::services::error::ScraperError;
use crate::services::scraper::{ListingDriver, ReviewScraper, ScraperFactory};

/// Raw caller input, validated by the factory before any navigation.
#[derive(Debug, Clone)]
pub struct ScrapeRequest {
    pub company_name: String,
    pub start_date: String,
    pub end_date: String,
    pub source: String,
}

/// Runs one full scrape: validate, acquire a session, resolve the company,
/// traverse the paginated listing, persist the records, tear the session
/// down. The session is closed on every exit path; on failure a screenshot
/// of the current page state is attempted first and the original error is
/// propagated unchanged.
pub async fn scrape_reviews(
    settings: &Settings,
    request: ScrapeRequest,
    cancel: CancellationToken,
) -> Result<Vec<Review>, ScraperError> {
    let scraper = ScraperFactory::get_scraper(
        &request.source,
        &request.company_name,
        &request.start_date,
        &request.end_date,
    )?;

    let droid = Droid::new(&settings.webdriver).await?;

    match run_scrape(&droid, scraper.as_ref(), &cancel).await {
        Ok(reviews) => {
            store_reviews(&request.company_name, &reviews);
            droid.quit().await;
            Ok(reviews)
        }
        Err(e) => {
            log::error!("Error during scraping: {}", e);
            droid.capture_failure_state().await;
            droid.quit().await;
            Err(e)
        }
    }
}

async fn run_scrape(
    droid: &Droid,
    scraper: &dyn ReviewScraper,
    cancel: &CancellationToken,
) -> Result<Vec<Review>, ScraperError> {
    let driver = &droid.driver;

    let slug = scraper.resolve_company(driver).await?;
    log::info!("First result found with slug: {}", slug);

    let reviews_url = scraper.reviews_url(&slug);
    log::info!("Navigating to reviews page: {}", reviews_url);
    driver.goto(&reviews_url).await?;
    scraper.await_listing(driver).await?;

    collect_reviews(droid, scraper, Local::now().date_naive(), cancel).await
}

/// The shared traversal loop, identical for both strategies: extract the
/// current page, keep in-window records, advance via the "next" affordance,
/// repeat until the affordance disappears. Error handling is the one
/// per-strategy difference: Capterra keeps what it has collected so far,
/// G2 escalates.
pub async fn collect_reviews(
    driver: &dyn ListingDriver,
    scraper: &dyn ReviewScraper,
    today: NaiveDate,
    cancel: &CancellationToken,
) -> Result<Vec<Review>, ScraperError> {
    let mut all_reviews: Vec<Review> = vec![];
    let mut page_count = 1u32;

    loop {
        if cancel.is_cancelled() {
            log::info!("Cancellation requested, stopping after page {}", page_count);
            break;
        }

        log::info!("Scraping page {}", page_count);
        let html = match driver.current_source().await {
            Ok(html) => {
                all_reviews.extend(scraper.extract_page(&html, today));
                html
            }
            Err(e) if scraper.halts_on_error() => return Err(e),
            Err(e) => {
                log::error!("Error while scraping reviews: {}", e);
                break;
            }
        };

        // Triggering the affordance and waiting for the render to settle are
        // coupled; reading the source before the new page renders would
        // yield stale results, so the settle wait keys off the page source
        // just extracted.
        let advanced = async {
            match driver.click_matching(scraper.next_page_selector()).await? {
                true => {
                    driver.wait_settled(&html).await?;
                    Ok(true)
                }
                false => Ok(false),
            }
        }
        .await;

        match advanced {
            Ok(true) => page_count += 1,
            Ok(false) => break,
            Err(e) if scraper.halts_on_error() => return Err(e),
            Err(e) => {
                log::error!("Error while scraping reviews: {}", e);
                break;
            }
        }
    }

    if all_reviews.is_empty() {
        log::warn!("No reviews found on the pages.");
    }

    Ok(all_reviews)
}
