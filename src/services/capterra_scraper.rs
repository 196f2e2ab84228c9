use async_trait::async_trait;
use chrono::NaiveDate;
use scraper::{ElementRef, Html, Selector};
use thirtyfour::{By, Key, WebDriver};

use crate::domain::dates::{parse_relative_date, within_window};
use crate::domain::{Rating, Review, ScrapeQuery};
use crate::services::droid::wait_for_element;
use crate::services::error::ScraperError;
use crate::services::scraper::ReviewScraper;

const HOME_URL: &str = "https://www.capterra.in/";
const REVIEW_CARD_SELECTOR: &str = ".review-card";
const NEXT_PAGE_SELECTOR: &str = r#"a.page-link[rel="next"]"#;

/// Capterra renders dates as relative text ("3 months ago") and carries all
/// review fields as positional text nodes, so extraction here is defensive:
/// every field has a literal fallback and only a missing date drops a card.
pub struct CapterraScraper {
    query: ScrapeQuery,
}

impl CapterraScraper {
    pub fn new(query: ScrapeQuery) -> Self {
        CapterraScraper { query }
    }
}

#[async_trait]
impl ReviewScraper for CapterraScraper {
    fn query(&self) -> &ScrapeQuery {
        &self.query
    }

    async fn resolve_company(&self, driver: &WebDriver) -> Result<String, ScraperError> {
        driver.goto(HOME_URL).await?;

        let search_field = driver.find(By::Css("#homeSearch")).await?;
        search_field.send_keys(self.query.company_name.as_str()).await?;
        search_field.send_keys(Key::Enter).await?;

        // No upper bound on this wait: if the results surface never renders
        // the run blocks here. Known limitation carried over deliberately.
        let first_result = wait_for_element(driver, By::Css(".entry"), None).await?;

        let slug = first_result
            .attr("href")
            .await?
            .map(|href| href.replace("/software", ""))
            .filter(|slug| !slug.is_empty());

        slug.ok_or_else(|| ScraperError::CompanyNotFound(self.query.company_name.clone()))
    }

    fn reviews_url(&self, slug: &str) -> String {
        format!("https://www.capterra.in/reviews{}", slug)
    }

    async fn await_listing(&self, _driver: &WebDriver) -> Result<(), ScraperError> {
        // The listing navigation itself settles the page; the first
        // extraction runs directly against the loaded source.
        Ok(())
    }

    fn extract_page(&self, html: &str, today: NaiveDate) -> Vec<Review> {
        let document = Html::parse_document(html);
        let card_selector = Selector::parse(REVIEW_CARD_SELECTOR).unwrap();

        document
            .select(&card_selector)
            .filter_map(|card| extract_review(card, &self.query, today))
            .collect()
    }

    fn next_page_selector(&self) -> &'static str {
        NEXT_PAGE_SELECTOR
    }

    fn halts_on_error(&self) -> bool {
        false
    }
}

fn extract_review(card: ElementRef, query: &ScrapeQuery, today: NaiveDate) -> Option<Review> {
    let date_text = select_text(card, ".mos-star-rating + span")
        .unwrap_or_else(|| "Unknown Date".to_string());

    let review_date = parse_relative_date(&date_text, today)
        .filter(|date| within_window(*date, query.start_date, query.end_date));
    if review_date.is_none() {
        log::warn!(
            "Review dated \"{}\" is out of the specified range.",
            date_text
        );
        return None;
    }

    let reviewer_name =
        select_text(card, ".h5.fw-bold.mb-2").unwrap_or_else(|| "Unknown Reviewer".to_string());
    let reviewer_position =
        select_text(card, ".text-ash.mb-2").unwrap_or_else(|| "Unknown Position".to_string());
    let company_size = select_text(card, ".col-12.col-md-6.col-lg-12 .mb-2")
        .unwrap_or_else(|| "Unknown Company Size".to_string());
    let title = select_text(card, "h3.h5.fw-bold").unwrap_or_else(|| "No Title".to_string());
    let review_comments =
        select_text(card, "p span:last-child").unwrap_or_else(|| "No Comments".to_string());
    let pros = select_text(card, "p.fw-bold + p").unwrap_or_else(|| "No Pros".to_string());
    let cons = select_text(card, "p.fw-bold.mb-2 + p").unwrap_or_else(|| "No Cons".to_string());
    let rating = select_text(card, ".mos-star-rating .ms-1")
        .and_then(|text| parse_leading_number(&text))
        .unwrap_or(0.0);

    Some(Review {
        title,
        reviewer_name: Some(reviewer_name),
        review_body: None,
        rating: Rating::Score(rating),
        date: date_text,
        reviewer_position: Some(reviewer_position),
        company_size: Some(company_size),
        review_comments: Some(review_comments),
        pros: Some(pros),
        cons: Some(cons),
    })
}

fn select_text(card: ElementRef, css: &str) -> Option<String> {
    let selector = Selector::parse(css).unwrap();
    card.select(&selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|text| !text.is_empty())
}

/// Rating nodes read like "4.5" or "4.5 stars"; take the first numeric token.
fn parse_leading_number(text: &str) -> Option<f64> {
    text.split_whitespace().next()?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ReviewSource;

    fn query(start: (i32, u32, u32), end: (i32, u32, u32)) -> ScrapeQuery {
        ScrapeQuery {
            company_name: "Acme".to_string(),
            start_date: NaiveDate::from_ymd_opt(start.0, start.1, start.2).unwrap(),
            end_date: NaiveDate::from_ymd_opt(end.0, end.1, end.2).unwrap(),
            source: ReviewSource::Capterra,
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
    }

    fn card(date_text: &str) -> String {
        format!(
            r#"<div class="review-card">
                <div class="h5 fw-bold mb-2">Jane Doe</div>
                <div class="text-ash mb-2">Product Manager</div>
                <div class="col-12 col-md-6 col-lg-12"><div class="mb-2">51-200 employees</div></div>
                <h3 class="h5 fw-bold">Great tool</h3>
                <div class="mos-star-rating"><span class="ms-1">4.5</span></div><span>{}</span>
                <p><span>Overall:</span><span>Solid product overall.</span></p>
                <p class="fw-bold">Pros</p><p>Easy to use</p>
                <p class="fw-bold mb-2">Cons</p><p>Gets pricey</p>
            </div>"#,
            date_text
        )
    }

    #[test]
    fn extracts_all_fields_from_a_full_card() {
        let scraper = CapterraScraper::new(query((2024, 1, 1), (2024, 12, 31)));
        let reviews = scraper.extract_page(&card("2 weeks ago"), today());

        assert_eq!(reviews.len(), 1);
        let review = &reviews[0];
        assert_eq!(review.title, "Great tool");
        assert_eq!(review.reviewer_name.as_deref(), Some("Jane Doe"));
        assert_eq!(review.reviewer_position.as_deref(), Some("Product Manager"));
        assert_eq!(review.company_size.as_deref(), Some("51-200 employees"));
        assert_eq!(
            review.review_comments.as_deref(),
            Some("Solid product overall.")
        );
        assert_eq!(review.pros.as_deref(), Some("Easy to use"));
        assert_eq!(review.cons.as_deref(), Some("Gets pricey"));
        assert_eq!(review.rating, Rating::Score(4.5));
        assert_eq!(review.date, "2 weeks ago");
        assert_eq!(review.review_body, None);
    }

    #[test]
    fn missing_fields_fall_back_to_placeholders() {
        let html = r#"<div class="review-card">
            <div class="mos-star-rating"></div><span>3 days ago</span>
        </div>"#;
        let scraper = CapterraScraper::new(query((2024, 1, 1), (2024, 12, 31)));
        let reviews = scraper.extract_page(html, today());

        assert_eq!(reviews.len(), 1);
        let review = &reviews[0];
        assert_eq!(review.title, "No Title");
        assert_eq!(review.reviewer_name.as_deref(), Some("Unknown Reviewer"));
        assert_eq!(review.reviewer_position.as_deref(), Some("Unknown Position"));
        assert_eq!(
            review.company_size.as_deref(),
            Some("Unknown Company Size")
        );
        assert_eq!(review.review_comments.as_deref(), Some("No Comments"));
        assert_eq!(review.pros.as_deref(), Some("No Pros"));
        assert_eq!(review.cons.as_deref(), Some("No Cons"));
        assert_eq!(review.rating, Rating::Score(0.0));
    }

    #[test]
    fn out_of_window_reviews_are_dropped() {
        let scraper = CapterraScraper::new(query((2024, 6, 1), (2024, 6, 30)));
        let reviews = scraper.extract_page(&card("5 years ago"), today());
        assert!(reviews.is_empty());
    }

    #[test]
    fn unparseable_dates_are_dropped() {
        let scraper = CapterraScraper::new(query((2024, 1, 1), (2024, 12, 31)));
        let reviews = scraper.extract_page(&card("a while back"), today());
        assert!(reviews.is_empty());
    }

    #[test]
    fn window_bounds_are_inclusive() {
        // "2 weeks ago" from 2024-06-15 is exactly 2024-06-01.
        let scraper = CapterraScraper::new(query((2024, 6, 1), (2024, 6, 1)));
        let reviews = scraper.extract_page(&card("2 weeks ago"), today());
        assert_eq!(reviews.len(), 1);
    }

    #[test]
    fn multiple_cards_keep_document_order() {
        let html = format!("{}{}", card("1 week ago"), card("2 weeks ago"));
        let scraper = CapterraScraper::new(query((2024, 1, 1), (2024, 12, 31)));
        let reviews = scraper.extract_page(&html, today());

        assert_eq!(reviews.len(), 2);
        assert_eq!(reviews[0].date, "1 week ago");
        assert_eq!(reviews[1].date, "2 weeks ago");
    }

    #[test]
    fn reviews_url_appends_slug() {
        let scraper = CapterraScraper::new(query((2024, 1, 1), (2024, 12, 31)));
        assert_eq!(
            scraper.reviews_url("/acme/12345"),
            "https://www.capterra.in/reviews/acme/12345"
        );
    }
}
