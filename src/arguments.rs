/// Centralized argument handling
///
/// Consolidates command-line argument parsing so every module reads flags the
/// same way. Arguments are stored in a thread-safe singleton so tests can
/// inject their own argument vectors.
use once_cell::sync::Lazy;
use std::env;
use std::sync::Mutex;

/// Global command-line arguments storage
/// Thread-safe singleton that stores arguments for access throughout the application
pub static CMD_ARGS: Lazy<Mutex<Vec<String>>> = Lazy::new(|| Mutex::new(env::args().collect()));

/// Sets the global command-line arguments
/// Used by tests to override the default env::args() collection
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

/// Help request check (--help or -h)
pub fn is_help_requested() -> bool {
    has_arg("--help") || has_arg("-h")
}

/// Configuration file path override (--config <path>)
pub fn get_config_override() -> Option<String> {
    get_arg_value("--config")
}

/// Print usage information
pub fn print_help() {
    println!("telescrape - Telegram channel ingestion");
    println!();
    println!("USAGE:");
    println!("    telescrape [OPTIONS]");
    println!();
    println!("OPTIONS:");
    println!("    --config <path>      Use a specific config file");
    println!("    --log-level <level>  Minimum log level (error|warning|info|debug|verbose)");
    println!("    --debug-<module>     Enable debug output for one module");
    println!("                         (system, config, auth, channel, media, storage,");
    println!("                          ratelimit, summary; --debug-all for everything)");
    println!("    --verbose            Enable verbose output globally");
    println!("    --quiet              Only show warnings and errors");
    println!("    --help, -h           Show this help");
    println!();
    println!("ENVIRONMENT:");
    println!("    TELEGRAM_API_ID      API identifier (overrides config file)");
    println!("    TELEGRAM_API_HASH    API secret (overrides config file)");
    println!("    TELEGRAM_PHONE       Account phone number (overrides config file)");
    println!("    TELEGRAM_PASSWORD    Two-factor secret (overrides config file)");
    println!("    DATA_LAKE_PATH       Root directory for raw output data");
}
