use clap::Arg;
use clap::Command;
use std::env;
use std::path::Path;
use std::process::exit;

use onyesha::config::{self, ConfigLoader, ServerConfig};
use onyesha::diagnostics::{self, PlaceholderError};
use onyesha::logger;
use onyesha::network::NetworkUtils;
use onyesha::qr::{self, QrError};
use onyesha::server::ServerLifecycle;
use onyesha::shutdown;
use onyesha::{PKG_NAME, PKG_VERSION, SERVER_SIGNATURE};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let key = "RUST_LOG";
    env::set_var(key, "onyesha=info");

    let matches = Command::new("Onyesha")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Preview a website project locally - serve a directory over HTTP with address reporting and mobile access helpers")
        .long_about("Onyesha ('show' in Swahili) serves a website project directory over HTTP for development preview.\n\nIt reports every address the site is reachable on (local, LAN, public), opens the browser for you, can render a QR code for phones on the same network, and can fill in placeholder assets the site still misses.")
        .arg(
            Arg::new("port")
                .short('p')
                .long("port")
                .value_parser(clap::value_parser!(u16))
                .help("Port number to serve on (default: 8000)"),
        )
        .arg(
            Arg::new("host")
                .long("host")
                .help("Address to bind to (default: 0.0.0.0)"),
        )
        .arg(
            Arg::new("directory")
                .short('d')
                .long("dir")
                .help("Directory to serve the site from (defaults to the current directory)"),
        )
        .arg(
            Arg::new("no-browser")
                .long("no-browser")
                .action(clap::ArgAction::SetTrue)
                .help("Don't open the site in a browser after start"),
        )
        .arg(
            Arg::new("qr")
                .long("qr")
                .action(clap::ArgAction::SetTrue)
                .help("Render a QR code image for mobile access after start"),
        )
        .arg(
            Arg::new("create-samples")
                .long("create-samples")
                .action(clap::ArgAction::SetTrue)
                .help("Create placeholder assets for missing images and videos before starting"),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Path to a configuration file (defaults to preview.json in the served directory)"),
        )
        .arg(
            Arg::new("no-request-logging")
                .short('L')
                .long("no-request-logging")
                .action(clap::ArgAction::SetTrue)
                .help("Disable HTTP request logging to keep console output clean"),
        )
        .arg(
            Arg::new("no-timestamps")
                .short('T')
                .long("no-timestamps")
                .action(clap::ArgAction::SetTrue)
                .help("Disable timestamps in log messages"),
        )
        .get_matches();

    // Initialize the logger
    let enable_request_logging = !matches.get_flag("no-request-logging");
    let enable_timestamps = !matches.get_flag("no-timestamps");
    logger::init_logger(enable_request_logging, enable_timestamps);
    let app_logger = logger::get_logger();

    app_logger.startup_info(PKG_NAME, PKG_VERSION);

    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let dir_arg = matches
        .get_one::<String>("directory")
        .map(String::as_str)
        .unwrap_or(".");

    let document_root = match Path::new(dir_arg).canonicalize() {
        Ok(path) => path,
        Err(_) => {
            app_logger.error(&format!("Unknown path: {}", dir_arg));
            exit(1)
        }
    };

    // The entry document is a hard precondition: without it the preview
    // would only ever show 404s.
    if !document_root.join("index.html").exists() {
        app_logger.error(&format!(
            "index.html not found in {}",
            document_root.display()
        ));
        app_logger.info("Run from your site directory, or point at it with --dir.");
        exit(1);
    }

    // Load the optional configuration file
    let custom_config = matches.get_one::<String>("config").map(|s| s.as_str());
    let config_loader = ConfigLoader::new(document_root.clone());
    let file_config = match config_loader.load(custom_config) {
        Ok(file_config) => file_config,
        Err(err) => {
            app_logger.error(&format!("Configuration error: {}", err));
            exit(1);
        }
    };

    // CLI flags override the configuration file
    let port = matches
        .get_one::<u16>("port")
        .copied()
        .or(file_config.port)
        .unwrap_or(config::DEFAULT_PORT);
    let host = matches
        .get_one::<String>("host")
        .cloned()
        .or(file_config.host)
        .unwrap_or_else(|| config::DEFAULT_HOST.to_string());
    let required_assets = file_config
        .required_assets
        .unwrap_or_else(diagnostics::default_required_assets);

    if !NetworkUtils::is_port_available("127.0.0.1", port) {
        app_logger.error(&format!("Port {} is already in use", port));
        app_logger.info("Pick another port, e.g. --port 8080");
        exit(1);
    }

    if matches.get_flag("create-samples") {
        create_samples(&document_root);
    }

    let server_config = match ServerConfig::new(&host, port, &document_root) {
        Ok(server_config) => server_config,
        Err(err) => {
            app_logger.error(&format!("Configuration error: {}", err));
            exit(1);
        }
    };

    let lifecycle = ServerLifecycle::new(server_config);
    let mut handle = match lifecycle.start() {
        Ok(handle) => handle,
        Err(err) => {
            app_logger.error(&err.to_string());
            if err.is_addr_in_use() {
                app_logger.info("Pick another port, e.g. --port 8080");
            }
            exit(1);
        }
    };

    // The site may reference assets that are not on disk yet; list them and
    // try to fill the gaps with samples, exactly once, right after start.
    let missing = diagnostics::missing_assets(&document_root, &required_assets);
    if !missing.is_empty() {
        app_logger.warn("Missing static assets:");
        for relative in &missing {
            app_logger.warn(&format!("  {}", relative));
        }
        create_samples(&document_root);
    }

    let public_ip = NetworkUtils::public_address().await;
    let addresses = NetworkUtils::create_server_addresses(&host, port, public_ip);

    app_logger.info(&format!("Document root: {}", document_root.display()));
    app_logger.server_info(
        SERVER_SIGNATURE,
        &addresses.local,
        addresses.network.as_deref(),
        addresses.public.as_deref(),
    );

    if addresses.public.is_none() {
        app_logger.info(
            "Public address unavailable; for internet access set up port forwarding on your router.",
        );
    }

    if !matches.get_flag("no-browser") {
        match open::that(&addresses.local) {
            Ok(()) => app_logger.info("Opened the site in your default browser"),
            Err(err) => app_logger.warn(&format!("Could not open browser: {}", err)),
        }
    }

    if matches.get_flag("qr") {
        // Phones scan the LAN address; fall back to local if there is none
        let qr_url = addresses.network.as_deref().unwrap_or(&addresses.local);
        match qr::generate(qr_url, &document_root) {
            Ok(path) => app_logger.info(&format!("QR code saved to {}", path.display())),
            Err(err @ QrError::Unavailable) => app_logger.info(&err.to_string()),
            Err(err) => app_logger.warn(&format!("Could not generate QR code: {}", err)),
        }
    }

    app_logger.info("Press Ctrl+C to stop");

    let serve_result = tokio::select! {
        _ = shutdown::wait_for_interrupt() => None,
        result = handle.stopped() => Some(result),
    };

    match serve_result {
        None => {
            app_logger.shutdown_message();
            handle.stop().await;
        }
        Some(Err(err)) => {
            app_logger.error(&format!("Server terminated unexpectedly: {}", err));
            exit(1);
        }
        Some(Ok(())) => {}
    }

    Ok(())
}

fn create_samples(document_root: &Path) {
    let app_logger = logger::get_logger();

    match diagnostics::synthesize_placeholders(document_root) {
        Ok(created) if created.is_empty() => {
            app_logger.info("All sample assets already exist. No files created.");
        }
        Ok(created) => {
            for path in &created {
                app_logger.info(&format!("Created sample: {}", path.display()));
            }
        }
        Err(err @ PlaceholderError::Unavailable) => app_logger.info(&err.to_string()),
        Err(err) => app_logger.warn(&format!("Could not create samples: {}", err)),
    }
}
