/// Search engine benchmark tool
///
/// Builds a synthetic corpus, runs seeded searches from a flat and a holding
/// start, and prints per-action visit/reward tables plus iteration
/// throughput. Useful for sizing time budgets before pointing the bot at a
/// real corpus.
///
/// Usage:
///   tool_search_bench [--seed <u64>] [--iterations <n>] [--paths <n>] [--budget-ms <n>]
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::time::{Duration, Instant};

use simbot::arguments::{get_arg_value, get_seed_arg};
use simbot::corpus::{build_pool, synthetic_changes, PathPool};
use simbot::search::{SearchParams, SearchTree, TradeAction};

fn arg_or(flag: &str, default: u64) -> u64 {
    get_arg_value(flag)
        .and_then(|raw| raw.trim().parse::<u64>().ok())
        .unwrap_or(default)
}

fn main() {
    let seed = get_seed_arg().unwrap_or(42);
    let iterations = arg_or("--iterations", 50_000);
    let path_count = arg_or("--paths", 128) as usize;
    let budget_ms = arg_or("--budget-ms", 500);

    let params = SearchParams::default();
    let mut rng = StdRng::seed_from_u64(seed);
    let rows = synthetic_changes(path_count, params.max_steps, &mut rng);
    let pool = match build_pool(rows, 1.0, params.max_steps) {
        Ok(pool) => pool,
        Err(e) => {
            eprintln!("Failed to build corpus: {}", e);
            std::process::exit(1);
        }
    };

    println!("Search benchmark");
    println!(
        "  corpus: {} paths x {} steps, seed {}",
        pool.len(),
        pool.horizon(),
        seed
    );
    println!();

    run_case("flat start", &pool, 0.0, TradeAction::DoNothing, params, seed, iterations);
    run_case("holding start", &pool, 100.0, TradeAction::Buy, params, seed, iterations);

    // Wall-clock throughput from the flat start
    let mut tree = match SearchTree::new(
        &pool,
        1.0,
        10.0,
        0.0,
        0,
        TradeAction::DoNothing,
        params,
        Some(seed),
    ) {
        Ok(tree) => tree,
        Err(e) => {
            eprintln!("Failed to build search: {}", e);
            std::process::exit(1);
        }
    };
    let budget = Duration::from_millis(budget_ms);
    let started = Instant::now();
    match tree.evaluate(budget) {
        Ok(completed) => {
            let elapsed = started.elapsed().as_secs_f64();
            println!(
                "wall clock: {} iterations in {:.3}s ({:.0} iters/sec), decision {}",
                completed,
                elapsed,
                completed as f64 / elapsed,
                tree.decide()
            );
        }
        Err(e) => {
            eprintln!("Evaluation failed: {}", e);
            std::process::exit(1);
        }
    }
}

fn run_case(
    label: &str,
    pool: &PathPool,
    holding: f64,
    previous_action: TradeAction,
    params: SearchParams,
    seed: u64,
    iterations: u64,
) {
    let mut tree = match SearchTree::new(
        pool,
        1.0,
        10.0,
        holding,
        0,
        previous_action,
        params,
        Some(seed),
    ) {
        Ok(tree) => tree,
        Err(e) => {
            eprintln!("Failed to build search: {}", e);
            std::process::exit(1);
        }
    };

    let started = Instant::now();
    if let Err(e) = tree.evaluate_iterations(iterations) {
        eprintln!("Evaluation failed: {}", e);
        std::process::exit(1);
    }
    let elapsed = started.elapsed().as_secs_f64();

    println!(
        "{}: {} iterations in {:.3}s, {} nodes, decision {}",
        label,
        iterations,
        elapsed,
        tree.node_count(),
        tree.decide()
    );
    for stat in tree.root_stats() {
        println!(
            "  {:<10} visits={:<8} mean_reward={:>10.4} roi={:>10.4}",
            stat.action.to_string(),
            stat.visits,
            stat.mean_reward,
            stat.roi
        );
    }
    println!();
}
