mod analysis;
mod config;
mod errors;
mod grammar;
mod routes;
mod state;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::analysis::extraction::PdfExtractor;
use crate::analysis::pipeline::Analyzer;
use crate::analysis::taxonomy::{KeywordTaxonomy, SectionTaxonomy};
use crate::config::Config;
use crate::grammar::languagetool::LanguageToolClient;
use crate::grammar::rate_limit::CallRateLimiter;
use crate::grammar::GrammarAdapter;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting ATS API v{}", env!("CARGO_PKG_VERSION"));

    // Taxonomies are built once and never change; a bad taxonomy is fatal
    let sections = Arc::new(SectionTaxonomy::builtin().context("Invalid section taxonomy")?);
    let keywords = Arc::new(KeywordTaxonomy::builtin().context("Invalid keyword taxonomy")?);
    info!(
        "Taxonomies loaded: {} sections, {} keywords (match mode: {})",
        sections.len(),
        keywords.len(),
        config.match_mode
    );

    // Initialize grammar engine client
    let languagetool = LanguageToolClient::new(
        &config.languagetool_url,
        &config.grammar_language,
        Duration::from_secs(config.grammar_timeout_secs),
    )
    .context("Failed to build grammar engine client")?;
    if config.grammar_preflight {
        languagetool
            .verify_language()
            .await
            .context("Grammar engine preflight failed")?;
    } else {
        warn!("Grammar engine preflight disabled");
    }
    info!(
        "Grammar engine: {} ({}), budget {} calls / {}s",
        config.languagetool_url,
        config.grammar_language,
        config.grammar_rate_limit,
        config.grammar_rate_window_secs
    );

    // One budget for the whole process, shared by every request
    let budget = Arc::new(
        CallRateLimiter::new(
            config.grammar_rate_limit,
            Duration::from_secs(config.grammar_rate_window_secs.get()),
        )
        .context("Invalid grammar call budget")?,
    );
    let grammar = GrammarAdapter::new(Arc::new(languagetool), budget);

    let analyzer = Analyzer::new(
        Arc::new(PdfExtractor),
        grammar,
        sections,
        keywords,
        config.match_mode,
    );

    // Build app state
    let state = AppState {
        analyzer,
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // browser frontend posts cross-origin

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
