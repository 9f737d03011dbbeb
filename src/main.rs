//! forest demo server.
//!
//! Serves a handful of routes that exercise every result kind:
//!
//! ```text
//! GET  /ping            → "pong"
//! GET  /data            → {"a":1}
//! GET  /old             → 302 to /ping (buffered redirect)
//! GET  /status/{code}   → bare status
//! POST /echo            → request body echoed back
//! ```
//!
//! Bind and serve failures are fatal: they are logged and the process exits
//! with a non-zero status.

use std::path::PathBuf;

use clap::Parser;

use forest::config::{load_config, ForestConfig};
use forest::{
    context, http_status, json_result, raw_result, ActionResult, BufferedResult, Route,
    StatusResult,
};

#[derive(Parser)]
#[command(name = "forest")]
#[command(about = "Minimal HTTP routing facade demo server", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override listener.bind_address.
    #[arg(short, long)]
    bind: Option<String>,
}

fn demo_routes() -> Vec<Route> {
    vec![
        Route::get("/ping", "ping", |_, _| raw_result("pong", http_status(200))),
        Route::get("/data", "data", |_, _| {
            json_result(&serde_json::json!({ "a": 1 }), http_status(200))
        }),
        Route::get("/old", "old", |_, res| {
            res.redirect_to("/ping");
            BufferedResult::default()
        }),
        Route::get("/status/{code}", "status", |req, _| -> Box<dyn ActionResult> {
            match req.param("code").and_then(|c| c.parse::<u16>().ok()) {
                Some(code) => StatusResult::new(http_status(code)).boxed(),
                None => raw_result("400 Bad Request", http_status(400)).boxed(),
            }
        }),
        Route::post("/echo", "echo", |req, _| {
            raw_result(String::from_utf8_lossy(req.body()), http_status(200))
        }),
    ]
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ForestConfig::default(),
    };
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
    }
    let address = config.listener.bind_address.clone();

    let ctx = context();
    ctx.initialise_with(config);
    tracing::info!("forest v{} starting", env!("CARGO_PKG_VERSION"));

    ctx.register_all(demo_routes())?;

    if let Err(e) = ctx.listen_and_serve(&address).await {
        tracing::error!(error = %e, address = %address, "Listener failed");
        std::process::exit(1);
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
