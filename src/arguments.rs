/// Centralized argument handling for SimBot
///
/// All command-line argument parsing and debug flag checking lives here so
/// binaries and the library share one view of the invocation.
///
/// Features:
/// - Centralized CMD_ARGS storage with thread-safe access
/// - Debug flag checking functions for all modules
/// - Unified argument parsing utilities
use once_cell::sync::Lazy;
use std::env;
use std::sync::Mutex;

/// Global command-line arguments storage
/// Thread-safe singleton that stores arguments for access throughout the application
pub static CMD_ARGS: Lazy<Mutex<Vec<String>>> = Lazy::new(|| Mutex::new(env::args().collect()));

/// Sets the global command-line arguments
/// Used by binaries and tests to override the default env::args() collection
pub fn set_cmd_args(args: Vec<String>) {
    if let Ok(mut cmd_args) = CMD_ARGS.lock() {
        *cmd_args = args;
    }
}

/// Gets a copy of the current command-line arguments
/// Returns a vector clone to avoid holding the mutex lock
pub fn get_cmd_args() -> Vec<String> {
    match CMD_ARGS.lock() {
        Ok(args) => args.clone(),
        Err(_) => {
            // Fallback to env::args if mutex is poisoned
            env::args().collect()
        }
    }
}

/// Checks if a specific argument is present in the command line
pub fn has_arg(arg: &str) -> bool {
    get_cmd_args().iter().any(|a| a == arg)
}

/// Gets the value of a command-line argument that follows a flag
/// Returns None if the flag is not found or has no value
pub fn get_arg_value(flag: &str) -> Option<String> {
    let args = get_cmd_args();
    for (i, arg) in args.iter().enumerate() {
        if arg == flag && i + 1 < args.len() {
            return Some(args[i + 1].clone());
        }
    }
    None
}

// =============================================================================
// DEBUG FLAG CHECKING FUNCTIONS
// These functions check for specific debug flags in the command-line arguments
// =============================================================================

/// Search engine debug mode (per-iteration diagnostics)
pub fn is_debug_search_enabled() -> bool {
    has_arg("--debug-search")
}

/// Trader tick-loop debug mode
pub fn is_debug_trader_enabled() -> bool {
    has_arg("--debug-trader")
}

/// Corpus loading debug mode
pub fn is_debug_corpus_enabled() -> bool {
    has_arg("--debug-corpus")
}

/// Help request
pub fn is_help_requested() -> bool {
    has_arg("--help") || has_arg("-h")
}

// =============================================================================
// VALUE ARGUMENTS
// =============================================================================

/// Path to the config file (--config <path>), defaults handled by caller
pub fn get_config_path_arg() -> Option<String> {
    get_arg_value("--config")
}

/// Deterministic RNG seed (--seed <u64>) for reproducible searches
pub fn get_seed_arg() -> Option<u64> {
    get_arg_value("--seed").and_then(|raw| raw.trim().parse::<u64>().ok())
}

/// Prints usage information for the main binary
pub fn print_help() {
    println!("SimBot - Monte Carlo tree search trading engine");
    println!();
    println!("USAGE:");
    println!("  simbot [OPTIONS]");
    println!();
    println!("OPTIONS:");
    println!("  --config <path>    Config file path (default: config.json)");
    println!("  --prices <path>    Replay price series (CSV, one price per row)");
    println!("  --corpus <path>    Corpus file with historical change trajectories");
    println!("  --seed <u64>       Deterministic RNG seed");
    println!("  --debug-search     Per-search diagnostics");
    println!("  --debug-trader     Tick loop diagnostics");
    println!("  --debug-corpus     Corpus loading diagnostics");
    println!("  -h, --help         Show this help");
}
