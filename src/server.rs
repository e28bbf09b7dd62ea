use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::extract::{Query, RawQuery, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tower_http::cors::{Any, CorsLayer};
use url::form_urlencoded;

use crate::cli::{ServeArgs, SourceArgs};
use crate::constants::{MAX_SUGGESTION_LIMIT, SUGGESTION_LIMIT};
use crate::download;
use crate::engine::filters::apply_filters;
use crate::engine::suggest::suggest;
use crate::session::Session;
use crate::url_state::{from_query_string, to_query_string};
use crate::view::{
    DoctorCardView, FilterControlsView, SpecialtyOptionView, SuggestionView, TESTID_SEARCH_INPUT,
    specialty_option_views,
};

#[derive(Clone)]
pub struct AppState {
    session: Arc<RwLock<Session>>,
    source: String,
}

impl AppState {
    pub fn new(session: Session, source: impl Into<String>) -> Self {
        Self {
            session: Arc::new(RwLock::new(session)),
            source: source.into(),
        }
    }
}

pub async fn run(opts: ServeArgs) -> anyhow::Result<()> {
    let source_label = opts
        .source
        .payload_file
        .clone()
        .unwrap_or_else(|| opts.source.source_url.clone());

    let mut session = Session::new();
    let ticket = session.begin_load();
    let state = AppState::new(session, source_label);

    spawn_load(state.session.clone(), opts.source.clone(), ticket);

    let app = router(state.clone());

    let addr: SocketAddr = format!("{}:{}", opts.host, opts.port)
        .parse()
        .context("parse host:port")?;

    tracing::info!("Listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // A fetch still in flight must not install data into a torn-down session.
    state.session.write().await.close();
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("failed to listen for ctrl-c: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}

fn spawn_load(
    session: Arc<RwLock<Session>>,
    source: SourceArgs,
    ticket: crate::session::LoadTicket,
) {
    tokio::spawn(async move {
        let result = download::load_payload(&source).await;
        let mut session = session.write().await;
        match result {
            Ok(payload) => session.complete_load(ticket, &payload),
            Err(e) => session.fail_load(ticket, &e),
        };
    });
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/stats", get(api_stats))
        .route("/api/doctors", get(api_doctors))
        .route("/api/suggest", get(api_suggest))
        .route("/api/specialties", get(api_specialties))
        .layer(cors)
        .with_state(state)
}

#[derive(Debug, Serialize)]
struct StatsResponse {
    loading: bool,
    doctor_count: usize,
    specialty_count: usize,
    source: String,
}

async fn api_stats(State(st): State<AppState>) -> impl IntoResponse {
    let session = st.session.read().await;
    Json(StatsResponse {
        loading: session.is_loading(),
        doctor_count: session.doctors().len(),
        specialty_count: session.specialties().len(),
        source: st.source.clone(),
    })
}

#[derive(Debug, Serialize)]
struct DoctorListResponse {
    loading: bool,
    query: String,
    search: String,
    total: usize,
    controls: FilterControlsView,
    doctors: Vec<DoctorCardView>,
}

async fn api_doctors(State(st): State<AppState>, RawQuery(raw): RawQuery) -> impl IntoResponse {
    let (filters, search) = from_query_string(raw.as_deref().unwrap_or(""));
    let session = st.session.read().await;

    let doctors: Vec<DoctorCardView> = apply_filters(session.doctors(), &search, &filters)
        .into_iter()
        .map(DoctorCardView::from)
        .collect();

    Json(DoctorListResponse {
        loading: session.is_loading(),
        query: to_query_string(&filters, &search),
        total: doctors.len(),
        controls: FilterControlsView::from(&filters),
        search,
        doctors,
    })
}

#[derive(Debug, Deserialize)]
struct SuggestParams {
    q: Option<String>,
    limit: Option<usize>,
}

#[derive(Debug, Serialize)]
struct SuggestResponse {
    input_test_id: &'static str,
    suggestions: Vec<SuggestionView>,
}

async fn api_suggest(
    State(st): State<AppState>,
    Query(p): Query<SuggestParams>,
) -> impl IntoResponse {
    let limit = p
        .limit
        .unwrap_or(SUGGESTION_LIMIT)
        .clamp(1, MAX_SUGGESTION_LIMIT);
    let session = st.session.read().await;
    let suggestions = suggest(session.doctors(), p.q.as_deref().unwrap_or(""), limit)
        .into_iter()
        .map(SuggestionView::from)
        .collect();

    Json(SuggestResponse {
        input_test_id: TESTID_SEARCH_INPUT,
        suggestions,
    })
}

#[derive(Debug, Serialize)]
struct SpecialtiesResponse {
    specialties: Vec<SpecialtyOptionView>,
}

// `q` narrows the options; the remaining parameters are the page's URL state
// and only decide which options are checked.
async fn api_specialties(State(st): State<AppState>, RawQuery(raw): RawQuery) -> impl IntoResponse {
    let raw = raw.unwrap_or_default();
    let (filters, _) = from_query_string(&raw);
    let needle = form_urlencoded::parse(raw.as_bytes())
        .find(|(k, _)| k == "q")
        .map(|(_, v)| v.into_owned())
        .unwrap_or_default();

    let session = st.session.read().await;
    let options = session.specialty_options(&needle);
    Json(SpecialtiesResponse {
        specialties: specialty_option_views(&options, &filters),
    })
}
