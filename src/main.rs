use tracing::{error, info};

use flock::web::WebServer;
use flock::{Config, Database};

#[tokio::main]
async fn main() {
    // Load configuration
    let config = match Config::load_with_env("config.toml") {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config.toml: {e}");
            eprintln!("Using default configuration.");
            let mut config = Config::default();
            config.apply_env_overrides();
            config
        }
    };

    if let Err(e) = config.validate() {
        eprintln!("Invalid configuration: {e}");
        std::process::exit(1);
    }

    // Initialize logging
    if let Err(e) = flock::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        // Fall back to console-only logging
        flock::logging::init_console_only(&config.logging.level);
    }

    info!("Flock - membership records");

    let db = match Database::open(&config.database.path).await {
        Ok(db) => db,
        Err(e) => {
            error!(path = %config.database.path, error = %e, "Failed to open database");
            std::process::exit(1);
        }
    };

    let server = match WebServer::new(&config, &db) {
        Ok(server) => server,
        Err(e) => {
            error!(error = %e, "Failed to configure web server");
            std::process::exit(1);
        }
    };

    info!("Web server configured on {}", server.addr());
    if let Err(e) = server.run().await {
        error!(error = %e, "Web server stopped");
        std::process::exit(1);
    }
}
