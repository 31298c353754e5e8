use std::sync::Arc;

use storefront::config::config::{load_config, print_schema};
use storefront::startup;
use storefront::utils::logger::init_logging;

#[tokio::main]
async fn main() {
    // "--schema" prints the config schema and exits, for operators
    // writing a config.yaml from scratch.
    if std::env::args().any(|arg| arg == "--schema") {
        print_schema();
        return;
    }

    let config = load_config();

    init_logging(&config.logging);

    if let Err(e) = startup::run(Arc::new(config)).await {
        eprintln!("Server error: {}", e);
        std::process::exit(1);
    }
}
