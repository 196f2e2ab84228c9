use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::Review;

const OUTPUT_DIR: &str = "scraped_reviews";

/// Writes the run's records as indented JSON, one file per company,
/// overwriting any previous run for the same company. A pure side effect:
/// failures are logged and never fail the run.
pub fn store_reviews(company_name: &str, reviews: &[Review]) {
    match try_store(company_name, reviews) {
        Ok(path) => log::info!("Data has been saved to {}", path.display()),
        Err(e) => log::error!("Error saving data for {}: {:?}", company_name, e),
    }
}

fn try_store(company_name: &str, reviews: &[Review]) -> anyhow::Result<PathBuf> {
    fs::create_dir_all(OUTPUT_DIR)?;

    let path = Path::new(OUTPUT_DIR).join(output_filename(company_name));
    let json = serde_json::to_string_pretty(reviews)?;
    fs::write(&path, json)?;

    Ok(path)
}

fn output_filename(company_name: &str) -> String {
    let slug = company_name
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_");
    format!("{}_reviews.json", slug)
}
