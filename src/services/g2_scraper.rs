use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use scraper::{ElementRef, Html, Selector};
use thirtyfour::{By, Key, WebDriver};

use crate::domain::dates::{parse_display_date, within_window};
use crate::domain::{Rating, Review, ScrapeQuery};
use crate::services::droid::wait_for_element;
use crate::services::error::ScraperError;
use crate::services::scraper::ReviewScraper;

const HOME_URL: &str = "https://www.g2.com/";
const REVIEW_CARD_SELECTOR: &str = ".paper--box";
const NEXT_PAGE_SELECTOR: &str = r#"a[rel="next"]"#;
const SEARCH_RESULT_TIMEOUT: Duration = Duration::from_secs(30);
const LISTING_TIMEOUT: Duration = Duration::from_secs(5);

/// G2 embeds review fields as item-scoped metadata attributes rather than
/// positional text nodes, and renders absolute dates, so no relative-date
/// conversion happens here. Unlike Capterra, any failure mid-run is fatal:
/// partial results are not kept.
pub struct G2Scraper {
    query: ScrapeQuery,
}

impl G2Scraper {
    pub fn new(query: ScrapeQuery) -> Self {
        G2Scraper { query }
    }
}

#[async_trait]
impl ReviewScraper for G2Scraper {
    fn query(&self) -> &ScrapeQuery {
        &self.query
    }

    async fn resolve_company(&self, driver: &WebDriver) -> Result<String, ScraperError> {
        driver.goto(HOME_URL).await?;

        let search_field = driver.find(By::Css(".ajax-search-field")).await?;
        search_field.click().await?;
        search_field.send_keys(self.query.company_name.as_str()).await?;
        search_field.send_keys(Key::Enter).await?;

        let first_result = wait_for_element(
            driver,
            By::Css(".link.js-log-click"),
            Some(SEARCH_RESULT_TIMEOUT),
        )
        .await
        .map_err(|_| ScraperError::CompanyNotFound(self.query.company_name.clone()))?;

        let slug = first_result
            .attr("href")
            .await?
            .and_then(|href| href.split('/').nth(4).map(str::to_string))
            .filter(|slug| !slug.is_empty());

        match slug {
            Some(slug) => {
                log::info!("Company Slug: {}", slug);
                Ok(slug)
            }
            None => Err(ScraperError::CompanyNotFound(
                self.query.company_name.clone(),
            )),
        }
    }

    fn reviews_url(&self, slug: &str) -> String {
        format!("https://www.g2.com/products/{}/reviews?order=most_recent", slug)
    }

    async fn await_listing(&self, driver: &WebDriver) -> Result<(), ScraperError> {
        // Bounded wait: a listing that never renders fails the run instead
        // of blocking it.
        wait_for_element(driver, By::Css(REVIEW_CARD_SELECTOR), Some(LISTING_TIMEOUT)).await?;
        Ok(())
    }

    fn extract_page(&self, html: &str, _today: NaiveDate) -> Vec<Review> {
        let document = Html::parse_document(html);
        let card_selector = Selector::parse(REVIEW_CARD_SELECTOR).unwrap();

        document
            .select(&card_selector)
            .filter_map(|card| extract_review(card, &self.query))
            .collect()
    }

    fn next_page_selector(&self) -> &'static str {
        NEXT_PAGE_SELECTOR
    }

    fn halts_on_error(&self) -> bool {
        true
    }
}

fn extract_review(card: ElementRef, query: &ScrapeQuery) -> Option<Review> {
    let date_text = select_attr(card, r#"meta[itemprop="datePublished"]"#, "content")
        .unwrap_or_else(|| "Unknown Date".to_string());

    let in_window = parse_display_date(&date_text)
        .map(|date| within_window(date, query.start_date, query.end_date))
        .unwrap_or(false);
    if !in_window {
        log::warn!(
            "Review dated \"{}\" is out of the specified range.",
            date_text
        );
        return None;
    }

    let title = select_text(card, r#"[itemprop="name"]"#).unwrap_or_else(|| "No Title".to_string());
    let reviewer_name = select_attr(card, r#"[itemprop="author"] meta[itemprop="name"]"#, "content")
        .unwrap_or_else(|| "Unknown Reviewer".to_string());
    let review_body = select_text(card, r#"[itemprop="reviewBody"]"#).unwrap_or_default();
    let rating = select_attr(card, r#"[itemprop="ratingValue"]"#, "content")
        .unwrap_or_else(|| "No Rating".to_string());

    Some(Review {
        title,
        reviewer_name: Some(reviewer_name),
        review_body: Some(review_body),
        rating: Rating::Label(rating),
        date: date_text,
        reviewer_position: None,
        company_size: None,
        review_comments: None,
        pros: None,
        cons: None,
    })
}

fn select_text(card: ElementRef, css: &str) -> Option<String> {
    let selector = Selector::parse(css).unwrap();
    card.select(&selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|text| !text.is_empty())
}

fn select_attr(card: ElementRef, css: &str, attr: &str) -> Option<String> {
    let selector = Selector::parse(css).unwrap();
    card.select(&selector)
        .next()
        .and_then(|element| element.value().attr(attr))
        .map(str::to_string)
        .filter(|value| !value.is_empty())
}
