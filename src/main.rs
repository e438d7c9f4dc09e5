use telescrape::{
    arguments::{is_help_requested, print_help},
    logger::{self, LogTag},
};

/// Main entry point for telescrape
///
/// Sequences: directory creation (the logger needs the logs directory before
/// it can open its file), logger initialization, help short-circuit, then the
/// full scraping run. A non-zero exit tells the pipeline orchestrator to skip
/// all downstream steps.
#[tokio::main]
async fn main() {
    // Ensure all directories exist BEFORE logger initialization
    if let Err(e) = telescrape::paths::ensure_all_directories() {
        eprintln!("Failed to create required directories: {}", e);
        std::process::exit(1);
    }

    // Initialize logger system (now safe to create log files)
    logger::init();

    // Check for help request first (before any other processing)
    if is_help_requested() {
        print_help();
        std::process::exit(0);
    }

    logger::info(LogTag::System, "telescrape starting up...");

    match telescrape::run::run_scraper().await {
        Ok(_) => {
            logger::info(LogTag::System, "telescrape completed successfully");
        }
        Err(e) => {
            logger::error(LogTag::System, &format!("telescrape failed: {}", e));
            logger::flush();
            std::process::exit(1);
        }
    }
}
