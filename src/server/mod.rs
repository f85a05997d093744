//! HTTP server rendering pages on request

pub mod pages;

use anyhow::Result;
use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use serde::Deserialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tera::Context;
use tower_http::trace::TraceLayer;

use crate::error::PressError;
use crate::query::PageNumber;
use crate::schema::Category;
use crate::templates::TemplateRenderer;
use crate::Press;

/// Server state
pub struct ServerState {
    press: Press,
    templates: TemplateRenderer,
}

impl ServerState {
    pub fn new(press: Press) -> Result<Self> {
        Ok(Self {
            press,
            templates: TemplateRenderer::new()?,
        })
    }

    /// Category menu; a failure here only costs the menu
    async fn nav(&self) -> Vec<Category> {
        match self.press.service.categories().await {
            Ok(categories) => categories,
            Err(e) => {
                tracing::warn!("Failed to load categories for navigation: {}", e);
                Vec::new()
            }
        }
    }

    fn render(&self, status: StatusCode, template: &str, context: &Context) -> Response {
        match self.templates.render(template, context) {
            Ok(html) => (status, Html(html)).into_response(),
            Err(e) => {
                tracing::error!("Failed to render {}: {:?}", template, e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Server error").into_response()
            }
        }
    }

    fn not_found(&self, nav: &[Category]) -> Response {
        let context = pages::status(&self.press, nav, 404);
        self.render(StatusCode::NOT_FOUND, "status.html", &context)
    }

    fn failure(&self, nav: &[Category], error: PressError) -> Response {
        let status = match error {
            PressError::Fetch(_) | PressError::Cancelled => StatusCode::SERVICE_UNAVAILABLE,
            PressError::InvalidPageSize(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        tracing::error!("Page failed with {}: {}", status, error);
        let context = pages::status(&self.press, nav, status.as_u16());
        self.render(status, "status.html", &context)
    }
}

/// `?page=` query; anything unparsable means page 1
#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    page: Option<String>,
}

impl PageParams {
    fn page(&self) -> PageNumber {
        self.page
            .as_deref()
            .map(PageNumber::parse)
            .unwrap_or_default()
    }
}

/// Build the router
pub fn router(state: Arc<ServerState>) -> Router {
    Router::new()
        .route("/", get(home_handler))
        .route("/articles/:slug", get(article_handler))
        .route("/categories/:slug", get(category_handler))
        .route("/manifest.webmanifest", get(manifest_handler))
        .fallback(fallback_handler)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the server
pub async fn start(press: &Press, ip: &str, port: u16) -> Result<()> {
    let state = Arc::new(ServerState::new(press.clone())?);
    let app = router(state);

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    println!("Server running at http://{}:{}", ip, port);
    println!("Press Ctrl+C to stop.");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn home_handler(
    State(state): State<Arc<ServerState>>,
    Query(params): Query<PageParams>,
) -> Response {
    let (result, nav) = tokio::join!(state.press.service.homepage(params.page()), state.nav());
    match result {
        Ok(homepage) => {
            let context = pages::home(&state.press, &nav, &homepage);
            state.render(StatusCode::OK, "home.html", &context)
        }
        Err(e) => state.failure(&nav, e),
    }
}

async fn article_handler(
    State(state): State<Arc<ServerState>>,
    Path(slug): Path<String>,
) -> Response {
    let related = state.press.config.related_count;
    let (result, nav) = tokio::join!(
        state.press.service.article_with_related(&slug, related),
        state.nav()
    );
    match result {
        Ok(Some(view)) => {
            let context = pages::article(&state.press, &nav, &view);
            state.render(StatusCode::OK, "article.html", &context)
        }
        Ok(None) => {
            tracing::debug!("No article with slug {:?}", slug);
            state.not_found(&nav)
        }
        Err(e) => state.failure(&nav, e),
    }
}

async fn category_handler(
    State(state): State<Arc<ServerState>>,
    Path(slug): Path<String>,
    Query(params): Query<PageParams>,
) -> Response {
    let (result, nav) = tokio::join!(
        state.press.service.category_page(&slug, params.page()),
        state.nav()
    );
    match result {
        Ok(Some(listing)) => {
            let context = pages::category(&state.press, &nav, &listing);
            state.render(StatusCode::OK, "category.html", &context)
        }
        Ok(None) => {
            tracing::debug!("No category with slug {:?}", slug);
            state.not_found(&nav)
        }
        Err(e) => state.failure(&nav, e),
    }
}

async fn manifest_handler(State(state): State<Arc<ServerState>>) -> Response {
    match serde_json::to_string(&pages::manifest(&state.press.config)) {
        Ok(body) => (
            [(header::CONTENT_TYPE, "application/manifest+json")],
            body,
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Failed to serialize manifest: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Server error").into_response()
        }
    }
}

async fn fallback_handler(State(state): State<Arc<ServerState>>) -> Response {
    let nav = state.nav().await;
    state.not_found(&nav)
}
