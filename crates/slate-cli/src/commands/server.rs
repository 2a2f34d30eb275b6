//! `slate server` — Start the Slate HTTP backend server.

pub async fn run(
    host: String,
    port: u16,
    db_path: String,
    static_dir: Option<String>,
) -> Result<(), String> {
    let config = slate_server::ServerConfig {
        host: host.clone(),
        port,
        db_path,
        static_dir,
    };

    println!("Starting Slate server on {}:{}...", host, port);

    let addr = slate_server::start_server(config).await?;
    println!("Slate server listening on http://{}", addr);

    // Keep the process running until interrupted
    tokio::signal::ctrl_c()
        .await
        .map_err(|e| format!("Failed to listen for Ctrl+C: {}", e))?;

    println!("\nShutting down...");
    Ok(())
}
