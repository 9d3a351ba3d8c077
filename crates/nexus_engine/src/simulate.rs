use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::context::RunContext;
use crate::{RunError, Severity, Strategy};

/// Delays between simulated phases. Pacing only; results never depend on them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pacing {
    pub dns: Duration,
    pub connect: Duration,
    pub browser_boot: Duration,
    pub navigate: Duration,
    pub api_auth: Duration,
    pub dom_analysis: Duration,
    pub page_base: Duration,
    /// Upper bound of the random extra added to each page.
    pub page_jitter: Duration,
    pub rate_limit_pause: Duration,
    pub normalize: Duration,
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            dns: Duration::from_millis(600),
            connect: Duration::from_millis(1200),
            browser_boot: Duration::from_millis(1500),
            navigate: Duration::from_millis(1000),
            api_auth: Duration::from_millis(800),
            dom_analysis: Duration::from_millis(1000),
            page_base: Duration::from_millis(800),
            page_jitter: Duration::from_millis(1000),
            rate_limit_pause: Duration::from_millis(1500),
            normalize: Duration::from_millis(800),
        }
    }
}

impl Pacing {
    /// No waiting at all; every phase still yields once.
    pub fn none() -> Self {
        Self {
            dns: Duration::ZERO,
            connect: Duration::ZERO,
            browser_boot: Duration::ZERO,
            navigate: Duration::ZERO,
            api_auth: Duration::ZERO,
            dom_analysis: Duration::ZERO,
            page_base: Duration::ZERO,
            page_jitter: Duration::ZERO,
            rate_limit_pause: Duration::ZERO,
            normalize: Duration::ZERO,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationSettings {
    pub pages: u32,
    pub items_min: u32,
    pub items_max: u32,
    /// A page pauses for rate limiting when a uniform draw exceeds this.
    pub rate_limit_threshold: f64,
    pub pacing: Pacing,
    /// Fixed seed for reproducible runs; OS randomness otherwise.
    pub seed: Option<u64>,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            pages: 3,
            items_min: 10,
            items_max: 34,
            rate_limit_threshold: 0.7,
            pacing: Pacing::default(),
            seed: None,
        }
    }
}

impl SimulationSettings {
    fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        }
    }
}

/// Runs the local stand-in pipeline and returns the number of items "extracted".
pub(crate) async fn run_simulation(
    ctx: &RunContext<'_>,
    settings: &SimulationSettings,
) -> Result<u64, RunError> {
    let pacing = &settings.pacing;
    let mut rng = settings.rng();
    let job = ctx.job;

    ctx.checkpoint()?;
    ctx.emit(Severity::Info, ctx.tagged(format_args!("Resolving DNS for {}...", job.url)));
    pause(pacing.dns).await;
    ctx.checkpoint()?;
    resolve_host(&job.url)?;

    ctx.emit(Severity::Info, ctx.tagged("Connecting to endpoint..."));
    pause(pacing.connect).await;
    ctx.checkpoint()?;
    let latency = rng.random_range(20..70);
    ctx.emit(
        Severity::Success,
        ctx.tagged(format_args!("Connection established (Latency: {latency}ms)")),
    );

    match job.strategy {
        Strategy::Dynamic => {
            ctx.emit(
                Severity::Info,
                ctx.tagged("Booting headless browser instance (Playwright)..."),
            );
            pause(pacing.browser_boot).await;
            ctx.checkpoint()?;
            ctx.emit(Severity::Info, ctx.tagged("Browser ready. Navigating to target..."));
            pause(pacing.navigate).await;
            ctx.checkpoint()?;
        }
        Strategy::Api => {
            ctx.emit(Severity::Info, ctx.tagged("Authenticating with API token..."));
            pause(pacing.api_auth).await;
            ctx.checkpoint()?;
        }
        Strategy::Static => {}
    }

    let container = &job.selectors.product_container;
    ctx.emit(
        Severity::Info,
        ctx.tagged(format_args!("Analyzing DOM structure for selector: '{container}'")),
    );
    // API locators are JSON paths, not CSS.
    if job.strategy != Strategy::Api && scraper::Selector::parse(container).is_err() {
        return Err(RunError::Failed(format!(
            "invalid container selector '{container}'"
        )));
    }
    pause(pacing.dom_analysis).await;

    let pages = settings.pages;
    let mut total: u64 = 0;
    for page in 1..=pages {
        ctx.checkpoint()?;
        ctx.emit(
            Severity::Info,
            ctx.tagged(format_args!("Scraping page {page} of {pages}...")),
        );
        let jitter = pacing.page_jitter.mul_f64(rng.random::<f64>());
        pause(pacing.page_base + jitter).await;
        ctx.checkpoint()?;

        let upper = settings.items_max.max(settings.items_min);
        let found = u64::from(rng.random_range(settings.items_min..=upper));
        total += found;
        ctx.emit(
            Severity::Success,
            ctx.tagged(format_args!("Page {page}: Successfully extracted {found} items")),
        );

        if rng.random::<f64>() > settings.rate_limit_threshold {
            ctx.checkpoint()?;
            ctx.emit(
                Severity::Info,
                ctx.tagged(format_args!(
                    "Rate limit safeguard triggered: Pausing for {:.1}s...",
                    pacing.rate_limit_pause.as_secs_f64()
                )),
            );
            pause(pacing.rate_limit_pause).await;
            ctx.checkpoint()?;
        }
    }

    ctx.checkpoint()?;
    ctx.emit(
        Severity::Info,
        ctx.tagged(format_args!("Normalizing {total} records to unified schema...")),
    );
    pause(pacing.normalize).await;
    ctx.checkpoint()?;

    ctx.emit(
        Severity::Success,
        ctx.tagged("Data pipeline commit successful. Job complete."),
    );
    Ok(total)
}

async fn pause(duration: Duration) {
    if duration.is_zero() {
        tokio::task::yield_now().await;
    } else {
        tokio::time::sleep(duration).await;
    }
}

fn resolve_host(target: &str) -> Result<String, RunError> {
    url::Url::parse(target)
        .ok()
        .and_then(|parsed| parsed.host_str().map(ToOwned::to_owned))
        .ok_or_else(|| RunError::Failed(format!("cannot resolve host for '{target}'")))
}
