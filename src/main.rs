use actix_web::{App, HttpServer};
use clap::Parser;
use env_logger::Env;
use log::{error, info};

use subs::settings::update_settings;
use subs::template::{render_template, TemplateArgs};
use subs::utils::fetch_subscription;
use subs::web_handlers::interfaces;
use subs::{rewrite_subscription, ClientKind, Settings};

/// Rewrite Clash and Surge subscriptions with standard proxy groups
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<String>,

    /// Listen address (e.g., 127.0.0.1 or 0.0.0.0)
    #[arg(short, long, value_name = "ADDRESS")]
    address: Option<String>,

    /// Listen port
    #[arg(short, long, value_name = "PORT")]
    port: Option<u32>,

    /// Subscription URL to process directly instead of starting the server
    #[arg(long, value_name = "URL")]
    url: Option<String>,

    /// Output file path for the rewritten subscription (must be used with --url)
    #[arg(short, long, value_name = "OUTPUT_FILE")]
    output: Option<String>,

    /// Client to rewrite for when processing a single URL
    #[arg(long, value_name = "KIND", default_value = "clash")]
    client_type: String,
}

async fn convert_once(url: &str, output: &str, kind: ClientKind) -> Result<(), String> {
    let upstream = fetch_subscription(url, kind)
        .await
        .map_err(|e| e.to_string())?;
    let result =
        rewrite_subscription(kind, &upstream.body, &upstream.headers).map_err(|e| e.to_string())?;
    let args = TemplateArgs {
        url: url.to_string(),
        body: result.body,
    };
    let body = render_template(kind, &args).map_err(|e| e.to_string())?;
    std::fs::write(output, body).map_err(|e| format!("Failed to write to output file: {}", e))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Check if only one of url or output is provided
    if args.url.is_some() != args.output.is_some() {
        eprintln!("Error: --url and -o/--output must be used together");
        std::process::exit(1);
    }

    let mut settings = match args.config.as_deref() {
        Some(path) => match Settings::load_from_file(path) {
            Ok(settings) => settings,
            Err(e) => {
                eprintln!("Error: failed to load config '{}': {}", path, e);
                std::process::exit(1);
            }
        },
        None => Settings::default(),
    };

    // Initialize the logger
    env_logger::init_from_env(Env::default().default_filter_or(settings.log_level.as_str()));

    // Override settings with command line arguments if provided
    if let Some(address) = args.address {
        settings.listen_address = address;
    }
    if let Some(port) = args.port {
        settings.listen_port = port;
    }
    let listen_address = settings.bind_address();
    let workers = settings.max_concur_threads;
    update_settings(settings);

    if let (Some(url), Some(output)) = (args.url, args.output) {
        let Some(kind) = ClientKind::from_str(&args.client_type) else {
            eprintln!("Error: unknown client type '{}'", args.client_type);
            std::process::exit(1);
        };
        info!("Processing subscription from URL: {} to file: {}", url, output);
        match convert_once(&url, &output, kind).await {
            Ok(()) => info!("Successfully wrote subscription to {}", output),
            Err(e) => {
                error!("Failed to process {}: {}", url, e);
                std::process::exit(1);
            }
        }
        return Ok(());
    }

    info!("Subs starting on {}", listen_address);

    HttpServer::new(|| App::new().configure(interfaces::config))
        .bind(listen_address)?
        .workers(workers)
        .run()
        .await
}
