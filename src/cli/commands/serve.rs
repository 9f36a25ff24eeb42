//! Web server command.

use console::style;

use crate::config::Settings;

/// Start the web server.
pub async fn cmd_serve(settings: &Settings) -> anyhow::Result<()> {
    println!(
        "{} Starting cardscan server at http://{}:{}",
        style("→").cyan(),
        settings.host,
        settings.port
    );
    println!("  Uploads: {}", settings.uploads_dir.display());
    if !settings.google_auth().is_configured() {
        println!(
            "  {} No Google credentials set (GOOGLE_API_KEY or GOOGLE_ACCESS_TOKEN)",
            style("!").yellow()
        );
    }
    println!("  Press Ctrl+C to stop");

    crate::server::serve(settings).await
}
