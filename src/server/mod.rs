//! Live server: renders pages on request with periodic revalidation

use anyhow::Result;
use axum::{
    extract::{Query, State},
    http::{StatusCode, Uri},
    response::{Html, IntoResponse, Response},
    routing::get,
    Form, Router,
};
use serde::Deserialize;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::cache::PageCache;
use crate::forms::{ContactForm, FormFields, FormRelay, FormSession, ResumeRequest};
use crate::generator::{Generator, Rendered, Route};
use crate::templates::FormData;
use crate::Site;

/// Server state
pub struct ServerState {
    generator: Generator,
    cache: PageCache,
    relay: Option<FormRelay>,
    resume_reset: Duration,
}

impl ServerState {
    pub fn new(site: &Site) -> Result<Self> {
        let relay = match FormRelay::new(&site.config.forms) {
            Ok(relay) => Some(relay),
            Err(e) => {
                tracing::warn!("Forms will not be delivered: {}", e);
                None
            }
        };

        Ok(Self {
            generator: Generator::new(site)?,
            cache: PageCache::new(site.config.revalidate()),
            relay,
            resume_reset: Duration::from_secs(site.config.forms.resume_reset_secs),
        })
    }
}

/// Query parameters understood by page routes
#[derive(Debug, Default, Deserialize)]
struct PageQuery {
    member: Option<String>,
}

/// Build the application router
pub fn router(site: &Site, state: Arc<ServerState>) -> Router {
    Router::new()
        .route("/contact", get(page_handler).post(contact_handler))
        .route("/contact/", get(page_handler).post(contact_handler))
        .route("/resume", get(page_handler).post(resume_handler))
        .route("/resume/", get(page_handler).post(resume_handler))
        .nest_service("/static", ServeDir::new(&site.static_dir))
        .fallback(page_handler)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Start the server
pub async fn start(site: &Site, ip: &str, port: u16) -> Result<()> {
    let state = Arc::new(ServerState::new(site)?);
    let app = router(site, state);

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    println!("Server running at http://{}:{}", ip, port);
    println!(
        "Pages revalidate every {}s. Press Ctrl+C to stop.",
        site.config.revalidate_secs
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// GET handler for every page route
async fn page_handler(
    State(state): State<Arc<ServerState>>,
    uri: Uri,
    Query(query): Query<PageQuery>,
) -> Response {
    let Some(route) = Route::parse(uri.path(), query.member.as_deref()) else {
        return respond(state.generator.render_not_found(uri.path(), "Page Not Found"));
    };

    // Form pages are cheap and vary by query string
    if route.has_form() {
        return respond(state.generator.render(&route).await);
    }

    let key = route.path();
    let result = state
        .cache
        .get_or_render(&key, Instant::now(), || state.generator.render(&route))
        .await;
    respond(result)
}

async fn contact_handler(
    State(state): State<Arc<ServerState>>,
    Form(fields): Form<ContactForm>,
) -> Response {
    let session = FormSession::new(ContactForm::default(), Duration::ZERO);
    let form = submit(&state, session, fields).await;
    respond(state.generator.render_form(&Route::Contact, &form))
}

async fn resume_handler(
    State(state): State<Arc<ServerState>>,
    Form(fields): Form<ResumeRequest>,
) -> Response {
    let route = Route::Resume {
        member: Some(fields.member_name.clone()).filter(|m| !m.trim().is_empty()),
    };
    let session = FormSession::new(
        ResumeRequest::for_member(Some(&fields.member_name)),
        state.resume_reset,
    );
    let form = submit(&state, session, fields).await;
    respond(state.generator.render_form(&route, &form))
}

/// Run one submission through the form state machine
async fn submit<F>(state: &ServerState, mut session: FormSession<F>, fields: F) -> FormData
where
    F: FormFields + serde::Serialize,
{
    session.fields = fields;
    if let Err(e) = session.begin() {
        tracing::warn!("{}", e);
        return FormData::from_session(&session);
    }

    let outcome = match &state.relay {
        Some(relay) => relay.submit(&session.fields).await,
        None => Err(crate::forms::RelayError::MissingKey),
    };
    session.finish(outcome, Instant::now());
    FormData::from_session(&session)
}

fn respond(result: Result<Rendered>) -> Response {
    match result {
        Ok(Rendered::Page(html)) => Html(html).into_response(),
        Ok(Rendered::NotFound(html)) => (StatusCode::NOT_FOUND, Html(html)).into_response(),
        Err(e) => {
            tracing::error!("Render failed: {:#}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Server error").into_response()
        }
    }
}
