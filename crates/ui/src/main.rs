//! Native viewer binary.
//!
//! Usage: `profgraph [server-url] [profile-file]`. The server URL
//! defaults to the local development server; a profile file passed on the
//! command line is generated immediately on startup.

#![cfg_attr(target_arch = "wasm32", allow(dead_code, unused_imports))]

use anyhow::Result;

#[cfg(not(target_arch = "wasm32"))]
fn main() -> Result<()> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let server_url = args
        .next()
        .unwrap_or_else(|| "http://127.0.0.1:5000".to_string());
    let initial_file = args.next();

    eframe::run_native(
        "profgraph",
        eframe::NativeOptions::default(),
        Box::new(move |cc| {
            Ok(Box::new(profgraph_ui::ViewerApp::new(
                cc,
                server_url,
                initial_file,
            )))
        }),
    )
    .map_err(|e| anyhow::anyhow!("{e}"))
}

#[cfg(target_arch = "wasm32")]
fn main() {}
