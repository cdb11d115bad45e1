//! Accepts connections one at a time and prints each parsed request head.

use anyhow::Context;
use httpfromtcp::config::Config;
use httpfromtcp::http::request::Request;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .init();

    let cfg = Config::load()?;
    let listener = TcpListener::bind(("0.0.0.0", cfg.port))
        .await
        .with_context(|| format!("failed to bind port {}", cfg.port))?;
    tracing::info!("Listening on {}", listener.local_addr()?);

    loop {
        let (mut socket, peer) = listener.accept().await?;
        tracing::info!("Accepted connection from {}", peer);

        match Request::from_reader(&mut socket).await {
            Ok(request) => print_request(&request),
            Err(e) => tracing::warn!("Failed to parse request from {}: {}", peer, e),
        }

        tracing::info!("Connection from {} closed", peer);
    }
}

fn print_request(request: &Request) {
    println!("Request line:");
    println!("- Method: {}", request.request_line.method);
    println!("- Target: {}", request.request_line.request_target);
    println!("- Version: {}", request.request_line.http_version);
    println!("Headers:");
    for (name, value) in request.headers.iter() {
        println!("- {}: {}", name, value);
    }
}
