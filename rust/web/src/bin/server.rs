//! Standalone web server binary
//!
//! Usage: cargo run -p greenfelt_web --bin greenfelt-web-server

use greenfelt_web::{ServerConfig, WebServer};
use std::path::PathBuf;
use std::time::Duration;

const HOUSEKEEPING_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    greenfelt_web::init_logging();

    // Parse command line arguments
    let args: Vec<String> = std::env::args().collect();
    let mut host = "127.0.0.1".to_string();
    let mut port = 8080u16;
    let mut static_dir: Option<PathBuf> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--host" | "-h" => {
                if i + 1 < args.len() {
                    host = args[i + 1].clone();
                    i += 2;
                } else {
                    eprintln!("Error: --host requires a value");
                    std::process::exit(1);
                }
            }
            "--port" | "-p" => {
                if i + 1 < args.len() {
                    port = args[i + 1].parse().unwrap_or_else(|_| {
                        eprintln!("Error: invalid port number");
                        std::process::exit(1);
                    });
                    i += 2;
                } else {
                    eprintln!("Error: --port requires a value");
                    std::process::exit(1);
                }
            }
            "--static-dir" | "-d" => {
                if i + 1 < args.len() {
                    static_dir = Some(PathBuf::from(&args[i + 1]));
                    i += 2;
                } else {
                    eprintln!("Error: --static-dir requires a value");
                    std::process::exit(1);
                }
            }
            "--help" => {
                print_help();
                std::process::exit(0);
            }
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
                print_help();
                std::process::exit(1);
            }
        }
    }

    // Determine static directory
    let static_path = if let Some(dir) = static_dir {
        dir
    } else {
        // Try to find the bundled front-end relative to the workspace root
        let current_dir = std::env::current_dir()?;
        let candidates = vec![
            current_dir.join("rust").join("web").join("public"),
            current_dir.join("public"),
            PathBuf::from("public"),
        ];

        candidates
            .into_iter()
            .find(|p| p.exists())
            .unwrap_or_else(|| {
                eprintln!("Error: Could not find static directory.");
                eprintln!("Tried:");
                eprintln!("  - rust/web/public");
                eprintln!("  - public");
                eprintln!("Please specify with --static-dir");
                std::process::exit(1);
            })
    };

    tracing::info!("Static directory: {}", static_path.display());

    // Create server configuration
    let config = ServerConfig::new(host.clone(), port, static_path);

    tracing::info!("Starting Greenfelt Casino Server");
    tracing::info!("  Host: {}", config.host());
    tracing::info!("  Port: {}", config.port());
    tracing::info!("  Static: {}", config.static_dir().display());

    // Create and start server
    let server = WebServer::new(config)?;
    let handle = server.start().await?;

    // Periodic housekeeping: drop idle sessions and log a metrics summary
    let sessions = handle.context().sessions();
    let metrics = handle.context().metrics();
    let housekeeping = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(HOUSEKEEPING_INTERVAL);
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let removed = sessions.cleanup_expired_sessions();
            if removed > 0 {
                tracing::info!(removed, "cleaned up expired sessions");
            }
            metrics.log_metrics();
        }
    });

    tracing::info!("Server running at http://{}", handle.address());
    println!("\n✅ Server running at http://{}", handle.address());
    println!("   Press Ctrl+C to stop\n");

    // Wait for Ctrl+C
    tokio::signal::ctrl_c().await?;

    tracing::info!("Shutting down server");
    println!("\n🛑 Shutting down...");
    housekeeping.abort();
    handle.shutdown().await?;
    tracing::info!("Server stopped cleanly");
    println!("✅ Server stopped cleanly\n");

    Ok(())
}

fn print_help() {
    println!("Greenfelt Casino Server");
    println!();
    println!("Usage: greenfelt-web-server [OPTIONS]");
    println!();
    println!("Options:");
    println!("  --host, -h <HOST>           Host to bind to (default: 127.0.0.1)");
    println!("  --port, -p <PORT>           Port to bind to (default: 8080)");
    println!("  --static-dir, -d <DIR>      Static files directory");
    println!("  --help                      Show this help message");
}
