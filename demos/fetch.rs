//! Fetch example
//!
//! Fetches every URL given on the command line concurrently and prints the
//! status, transport metadata and the start of each body.
//!
//! Run with: cargo run --example fetch -- [--insecure] <url>...
//!
//! Set ROUTEWIRE_FORCE_LEGACY_TRANSPORT=1 to use the HTTP/1.1 transport.

use routewire::{Client, ClientConfig, Dispatcher};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let mut insecure = false;
    let mut urls = Vec::new();
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--insecure" => insecure = true,
            _ => urls.push(arg),
        }
    }
    if urls.is_empty() {
        eprintln!("usage: fetch [--insecure] <url>...");
        std::process::exit(2);
    }

    let client = match Client::with_config(ClientConfig::from_env()) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("invalid client configuration: {}", e);
            std::process::exit(2);
        }
    };
    println!("Routewire Fetch Example");
    println!("=======================\n");
    println!("Transport: {}\n", client.transport_kind());

    let dispatcher = Dispatcher::new(4);
    let mut pending = Vec::new();
    for url in &urls {
        let request = match client.get(url) {
            Ok(request) => request,
            Err(e) => {
                eprintln!("{}: {}", url, e);
                continue;
            }
        };
        let mut request = request
            .with_attempts(3)
            .with_retry_delay(Duration::from_millis(200))
            .allow_error_status();
        if insecure {
            request = request.disable_certificate_validation();
        }
        pending.push((url.clone(), dispatcher.submit(request)));
    }

    for (url, response) in pending {
        match response.await {
            Ok(response) => {
                println!("{} -> {}", url, response.status());
                for (key, value) in response.metadata() {
                    if key != "peer-certificate" {
                        println!("  {}: {}", key, value);
                    }
                }
                let text = response.text();
                let preview: String = text.chars().take(200).collect();
                println!("  body: {}\n", preview);
            }
            Err(e) => println!("{} -> error: {}\n", url, e),
        }
    }
}
