use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use simbot::arguments::{
    get_arg_value, get_config_path_arg, get_seed_arg, is_help_requested, print_help,
};
use simbot::config::Config;
use simbot::corpus::{self, PathPool};
use simbot::logger::{self, log, LogTag};
use simbot::trader::{PaperExecution, TraderEngine};
use simbot::utils::format_price;

/// Main entry point for SimBot
///
/// Loads the config, assembles the trajectory corpus, then replays a price
/// series tick by tick, running one tree search per tick and paper-executing
/// the decisions.
fn main() {
    if is_help_requested() {
        print_help();
        std::process::exit(0);
    }

    logger::header("Monte Carlo tree search trader");

    let config_path = get_config_path_arg().unwrap_or_else(|| "config.json".to_string());
    let config = match Config::load(&config_path) {
        Ok(config) => config,
        Err(e) => {
            log(LogTag::Config, "ERROR", &format!("{:#}", e));
            std::process::exit(1);
        }
    };
    log(
        LogTag::Config,
        "INFO",
        &format!(
            "Loaded {} (horizon {}, batch {}, budget {}s)",
            config_path,
            config.search.max_steps,
            config.search.batch_size,
            config.search.time_budget_secs
        ),
    );

    let seed = get_seed_arg();
    if let Some(seed) = seed {
        log(LogTag::System, "INFO", &format!("Deterministic seed {}", seed));
    }

    if let Err(e) = run(&config, seed) {
        log(LogTag::System, "ERROR", &format!("{:#}", e));
        std::process::exit(1);
    }
}

fn run(config: &Config, seed: Option<u64>) -> anyhow::Result<()> {
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    // Price series to replay: file if given, synthetic random walk otherwise
    let prices = match get_arg_value("--prices") {
        Some(path) => {
            let prices = corpus::load_price_series_csv(&path)?;
            log(
                LogTag::System,
                "INFO",
                &format!("Replaying {} ticks from {}", prices.len(), path),
            );
            prices
        }
        None => {
            let prices = synthetic_price_series(100, 1.0, &mut rng);
            log(
                LogTag::System,
                "INFO",
                "No --prices file given, replaying a synthetic 100-tick walk",
            );
            prices
        }
    };
    let base_price = prices.first().copied().unwrap_or(1.0);

    let pool = build_corpus(config, base_price, &mut rng)?;
    log(
        LogTag::Corpus,
        "INFO",
        &format!(
            "Corpus ready: {} paths covering {} steps",
            pool.len(),
            pool.horizon()
        ),
    );

    let mut engine = TraderEngine::new(&pool, config, seed);
    let mut exec = PaperExecution::new(config.trader.investment * 10.0);
    let starting_balance = exec.balance;

    let summary = engine.run_series(&prices, &mut exec)?;

    logger::separator();
    log(
        LogTag::Trader,
        "INFO",
        &format!(
            "Session: {} ticks, {} buys, {} sells, {} holds",
            summary.ticks, summary.buys, summary.sells, summary.holds
        ),
    );
    let level = if exec.realized_pnl >= 0.0 { "SUCCESS" } else { "WARN" };
    log(
        LogTag::Trader,
        level,
        &format!(
            "Balance {} -> {} (realized PnL {:.4})",
            format_price(starting_balance),
            format_price(exec.balance),
            exec.realized_pnl
        ),
    );

    Ok(())
}

/// Corpus from a file when configured, synthetic random walks otherwise
fn build_corpus(config: &Config, base_price: f64, rng: &mut StdRng) -> anyhow::Result<PathPool> {
    let corpus_path = get_arg_value("--corpus").or_else(|| config.corpus.path.clone());
    let rows = match corpus_path {
        Some(path) => corpus::loader::load_changes(&path)?,
        None => {
            let count = config.corpus.synthetic_paths.max(1);
            corpus::synthetic_changes(count, config.search.max_steps, rng)
        }
    };
    let pool = corpus::build_pool(rows, base_price, config.search.max_steps)?;
    Ok(pool)
}

fn synthetic_price_series(ticks: usize, start: f64, rng: &mut StdRng) -> Vec<f64> {
    let mut price = start;
    (0..ticks)
        .map(|_| {
            price *= 1.0 + rng.gen_range(-0.05..0.05);
            price
        })
        .collect()
}
