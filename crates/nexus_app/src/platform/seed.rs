use nexus_core::{
    JobRunResult, JobStateStore, RunOutcome, ScraperConfig, ScraperStatus, SelectorSet,
    SiteStrategy,
};

fn selectors(container: &str, name: &str, price: &str, image: &str) -> SelectorSet {
    SelectorSet {
        product_container: container.to_string(),
        name: name.to_string(),
        price: price.to_string(),
        image: image.to_string(),
    }
}

/// Store the console starts with: three supermarket scrapers and a short run history.
pub fn demo_store() -> JobStateStore {
    let jobs = vec![
        ScraperConfig {
            id: "1".to_string(),
            name: "RB Patel Fiji".to_string(),
            base_url: "https://www.rbpatel.com.fj".to_string(),
            strategy: SiteStrategy::Dynamic,
            status: ScraperStatus::Idle,
            last_run: Some("2023-10-26T14:30:00Z".to_string()),
            products_count: 4520,
            schedule: "Daily @ 03:00".to_string(),
            selectors: selectors(
                ".product-item",
                ".product-title",
                ".price-current",
                ".product-image img",
            ),
        },
        ScraperConfig {
            id: "2".to_string(),
            name: "MH Supermarket".to_string(),
            base_url: "https://www.mh.com.fj".to_string(),
            strategy: SiteStrategy::Static,
            // Seeded idle: a RUNNING row here would have no engine run behind it.
            status: ScraperStatus::Idle,
            last_run: Some("2023-10-27T08:00:00Z".to_string()),
            products_count: 3105,
            schedule: "Daily @ 04:00".to_string(),
            selectors: selectors(
                "div.product-card",
                "h2.woocommerce-loop-product__title",
                "span.price",
                "img.attachment-woocommerce_thumbnail",
            ),
        },
        ScraperConfig {
            id: "3".to_string(),
            name: "New World Fiji".to_string(),
            base_url: "https://www.newworld.com.fj".to_string(),
            strategy: SiteStrategy::Api,
            status: ScraperStatus::Scheduled,
            last_run: Some("2023-10-26T22:15:00Z".to_string()),
            products_count: 5890,
            schedule: "Hourly".to_string(),
            selectors: selectors("json.products", "name", "prices.final", "images.primary"),
        },
    ];

    let history = vec![
        JobRunResult {
            id: "seed-j1".to_string(),
            scraper_id: "2".to_string(),
            scraper_name: "MH Supermarket".to_string(),
            start_time: "2023-10-27T08:00:00Z".to_string(),
            duration: "4m 32s".to_string(),
            items_scraped: 3105,
            outcome: RunOutcome::Success,
            error_details: None,
        },
        JobRunResult {
            id: "seed-j2".to_string(),
            scraper_id: "1".to_string(),
            scraper_name: "RB Patel Fiji".to_string(),
            start_time: "2023-10-27T03:00:00Z".to_string(),
            duration: "12m 10s".to_string(),
            items_scraped: 4501,
            outcome: RunOutcome::Partial,
            error_details: Some("Timeout on category: Electronics".to_string()),
        },
        JobRunResult {
            id: "seed-j3".to_string(),
            scraper_id: "3".to_string(),
            scraper_name: "New World Fiji".to_string(),
            start_time: "2023-10-26T22:15:00Z".to_string(),
            duration: "1m 45s".to_string(),
            items_scraped: 5890,
            outcome: RunOutcome::Success,
            error_details: None,
        },
    ];

    JobStateStore::with_seed(jobs, history)
}
