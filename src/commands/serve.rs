//! Serve the site over HTTP

use anyhow::Result;

use crate::Press;

/// Start the page server
pub async fn run(press: &Press, ip: &str, port: u16) -> Result<()> {
    tracing::info!(
        "Serving {} on {}:{} (home {} per page, category {} per page)",
        press.config.title,
        ip,
        port,
        press.config.home_per_page,
        press.config.category_per_page
    );
    crate::server::start(press, ip, port).await
}
