use env_logger::Env;
use tokio_util::sync::CancellationToken;
use verdict::configuration::get_configuration;
use verdict::services::{scrape_reviews, ScrapeRequest};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let configuration = get_configuration().expect("Failed to read configuration.");

    // One hardcoded query per invocation; there is no CLI flag surface.
    let request = ScrapeRequest {
        company_name: "Yellow.ai".to_string(),
        start_date: "2014-01-01".to_string(),
        end_date: "2024-12-31".to_string(),
        source: "capterra".to_string(),
    };

    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::info!("Interrupt received, stopping after the current page");
            interrupt.cancel();
        }
    });

    let reviews = scrape_reviews(&configuration, request, cancel).await?;
    log::info!("Scraped {} reviews", reviews.len());

    Ok(())
}
