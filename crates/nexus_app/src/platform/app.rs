use std::io::BufRead;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use nexus_core::{update, AppState, Msg, ScraperDraft, ScraperStatus, SelectorSet};
use nexus_engine::{suggest_or_default, OfflineAdvisor, SelectorPrediction};
use nexus_logging::{nexus_info, nexus_warn};

use super::commands::{self, Command, HELP};
use super::config::AppConfig;
use super::effects::EffectRunner;
use super::render::{self, ConsolePrinter};
use super::seed;

const TICK: Duration = Duration::from_millis(75);
const DEFAULT_SCHEDULE: &str = "Manual";

enum Input {
    Line(String),
    Closed,
}

pub fn run_app() -> anyhow::Result<()> {
    let (config, warnings) = AppConfig::from_env();
    nexus_logging::initialize(config.log_destination, config.log_level);
    for warning in &warnings {
        nexus_warn!("{}", warning);
    }
    nexus_info!(
        "Starting console backend={} seed={:?}",
        config.engine.backend.base_url,
        config.engine.simulation.seed
    );

    let runner = EffectRunner::new(config.engine);
    let mut state = AppState::with_store(seed::demo_store());
    let mut printer = ConsolePrinter::default();

    let (input_tx, input_rx) = mpsc::channel::<Input>();
    thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if input_tx.send(Input::Line(line)).is_err() {
                return;
            }
        }
        let _ = input_tx.send(Input::Closed);
    });

    println!("Nexus scraper console. Type `help` for commands.");
    print!("{}", render::scrapers_table(&state.view()));

    loop {
        for msg in runner.drain() {
            state = dispatch(state, msg, &runner);
        }

        match input_rx.recv_timeout(TICK) {
            Ok(Input::Line(line)) => match commands::parse(&line) {
                Ok(Some(Command::Quit)) => break,
                Ok(Some(command)) => state = execute(state, command, &runner),
                Ok(None) => {}
                Err(err) => println!("{err}"),
            },
            Ok(Input::Closed) | Err(mpsc::RecvTimeoutError::Disconnected) => break,
            Err(mpsc::RecvTimeoutError::Timeout) => {
                state = dispatch(state, Msg::Tick, &runner);
            }
        }

        if state.consume_dirty() {
            let view = state.view();
            for line in printer.fresh_lines(&view) {
                println!("{line}");
            }
            if let Some(status) = printer.status_change(&view) {
                println!("{status}");
            }
        }
    }

    nexus_info!("Console closing; active runs are abandoned");
    runner.shutdown();
    Ok(())
}

fn dispatch(state: AppState, msg: Msg, runner: &EffectRunner) -> AppState {
    let (next, effects) = update(state, msg);
    runner.enqueue(effects);
    next
}

fn execute(state: AppState, command: Command, runner: &EffectRunner) -> AppState {
    match command {
        Command::Dispatch(msg) => dispatch(state, msg, runner),
        Command::List => {
            print!("{}", render::scrapers_table(&state.view()));
            state
        }
        Command::History => {
            print!("{}", render::history_table(&state.view()));
            state
        }
        Command::Help => {
            println!("{HELP}");
            state
        }
        Command::Create {
            strategy,
            url,
            name,
        } => {
            let suggested = suggest_selectors(&url);
            if suggested.strategy_recommendation.as_str() != strategy.as_str() {
                println!(
                    "note: advisor recommends {} ({:.0}% confidence)",
                    suggested.strategy_recommendation.as_str(),
                    suggested.confidence * 100.0
                );
            }
            let draft = ScraperDraft {
                name,
                base_url: url,
                strategy,
                schedule: DEFAULT_SCHEDULE.to_string(),
                selectors: selector_set(suggested),
            };
            save(state, None, draft, runner)
        }
        Command::Edit {
            id,
            strategy,
            url,
            name,
        } => {
            let Some(current) = state.store().get(&id) else {
                println!("no scraper with id {id}");
                return state;
            };
            if current.status == ScraperStatus::Running {
                println!("scraper {id} is running; stop it before editing");
                return state;
            }
            let draft = ScraperDraft {
                name,
                base_url: url,
                strategy,
                schedule: current.schedule.clone(),
                selectors: current.selectors.clone(),
            };
            save(state, Some(id), draft, runner)
        }
        Command::Quit => state,
    }
}

fn save(
    state: AppState,
    editing: Option<String>,
    draft: ScraperDraft,
    runner: &EffectRunner,
) -> AppState {
    if let Err(err) = draft.validate() {
        println!("not saved: {err}");
        return state;
    }
    let before = state.store().jobs().len();
    let next = dispatch(state, Msg::ScraperSaved { editing, draft }, runner);
    if next.store().jobs().len() > before {
        if let Some(created) = next.store().jobs().last() {
            println!("created scraper {} ({})", created.id, created.name);
        }
    }
    next
}

/// Asks the offline advisor for starting selectors. There is no page sample at this point.
fn suggest_selectors(url: &str) -> SelectorPrediction {
    match tokio::runtime::Builder::new_current_thread().build() {
        Ok(runtime) => runtime.block_on(suggest_or_default(&OfflineAdvisor, "", url)),
        Err(err) => {
            nexus_warn!("Cannot start advisor runtime: {}", err);
            SelectorPrediction::fallback()
        }
    }
}

fn selector_set(prediction: SelectorPrediction) -> SelectorSet {
    SelectorSet {
        product_container: prediction.container,
        name: prediction.name,
        price: prediction.price,
        image: prediction.image,
    }
}

#[cfg(test)]
mod tests {
    use nexus_engine::Strategy;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn new_scrapers_start_from_the_offline_suggestion() {
        let suggested = suggest_selectors("https://shop.example.com");
        assert_eq!(suggested.strategy_recommendation, Strategy::Static);

        let selectors = selector_set(suggested);
        assert_eq!(selectors.product_container, ".product-card");
        assert_eq!(selectors.name, ".product-title");
        assert_eq!(selectors.price, ".current-price");
        assert_eq!(selectors.image, "img.product-thumb");
    }
}
