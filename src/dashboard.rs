use anyhow::{Context, Result};
use axum::{
    extract::{Path, Query, State},
    response::{Html, IntoResponse},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tower_http::validate_request::ValidateRequestHeaderLayer;
use tracing::{debug, info};

use crate::config::Config;
use crate::geo::{CountryRecord, GeoDataset};
use crate::globe::{render_globe, Figure};
use crate::news::{NewsClient, NewsItem};
use crate::panel::{build_panel, PanelContent};
use crate::risk::CountryTier;
use crate::translate::{Language, Translator};
use crate::view::{apply, clamp_zoom, plan, Action, MapStyle, PanelStyle, Trigger, ViewState};

/// Shared state for the dashboard server. Immutable after startup.
#[derive(Clone)]
pub struct AppState {
    pub geo: Arc<GeoDataset>,
    pub news: Arc<NewsClient>,
    pub translator: Arc<Translator>,
}

impl AppState {
    pub fn new(config: &Config, geo: GeoDataset) -> Result<Self> {
        Ok(AppState {
            geo: Arc::new(geo),
            news: Arc::new(NewsClient::new(config)?),
            translator: Arc::new(Translator::new(config)?),
        })
    }
}

// ─── Request / response types ──────────────────────────

#[derive(Deserialize)]
pub struct InteractRequest {
    #[serde(default)]
    state: ViewState,
    trigger: Trigger,
}

/// Absent fields mean "leave as is" on the client.
#[derive(Debug, Serialize)]
pub struct InteractResponse {
    state: ViewState,
    #[serde(skip_serializing_if = "Option::is_none")]
    map_style: Option<MapStyle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    panel_style: Option<PanelStyle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    panel: Option<PanelContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    figure: Option<Figure>,
}

impl InteractResponse {
    fn state_only(state: ViewState) -> Self {
        InteractResponse {
            state,
            map_style: None,
            panel_style: None,
            panel: None,
            figure: None,
        }
    }
}

#[derive(Serialize)]
struct LanguageOption {
    value: Language,
    label: &'static str,
}

#[derive(Serialize)]
struct NewsResponse {
    country: String,
    tier: CountryTier,
    fetched_at: DateTime<Utc>,
    items: Option<Vec<NewsItem>>,
}

#[derive(Deserialize)]
pub struct GlobeQuery {
    country: Option<String>,
    zoom: Option<f64>,
}

// ─── Handlers ──────────────────────────────────────────

async fn api_countries(State(state): State<AppState>) -> Json<Vec<CountryRecord>> {
    Json(state.geo.countries().to_vec())
}

async fn api_languages() -> impl IntoResponse {
    let options: Vec<LanguageOption> = Language::ALL
        .iter()
        .map(|&l| LanguageOption {
            value: l,
            label: l.label(),
        })
        .collect();
    Json(options)
}

async fn api_globe(
    State(state): State<AppState>,
    Query(params): Query<GlobeQuery>,
) -> Json<Figure> {
    let zoom = clamp_zoom(params.zoom.unwrap_or(crate::view::DEFAULT_ZOOM));
    Json(render_globe(&state.geo, params.country.as_deref(), zoom))
}

async fn api_news(State(state): State<AppState>, Path(country): Path<String>) -> impl IntoResponse {
    let country = country.trim().to_string();
    let items = state.news.get_country_news(&country).await;
    Json(NewsResponse {
        tier: CountryTier::of(&country),
        country,
        fetched_at: Utc::now(),
        items,
    })
}

async fn api_interact(
    State(state): State<AppState>,
    Json(req): Json<InteractRequest>,
) -> Json<InteractResponse> {
    let action = plan(&req.state, &req.trigger);
    let next = apply(&req.state, &action);
    debug!("Interaction {:?} -> {:?}", req.trigger, action);

    let response = match &action {
        Action::Zoom { zoom } => {
            let figure = render_globe(&state.geo, next.selected_country.as_deref(), *zoom);
            InteractResponse {
                figure: Some(figure),
                ..InteractResponse::state_only(next)
            }
        }
        Action::Close { zoom } => InteractResponse {
            map_style: Some(MapStyle::full()),
            panel_style: Some(PanelStyle::hidden()),
            panel: Some(PanelContent::Clear),
            figure: Some(render_globe(&state.geo, None, *zoom)),
            ..InteractResponse::state_only(next)
        },
        Action::Collapse { .. } => InteractResponse {
            map_style: Some(MapStyle::full()),
            panel_style: Some(PanelStyle::hidden()),
            panel: Some(PanelContent::Clear),
            ..InteractResponse::state_only(next)
        },
        Action::Open {
            country,
            zoom,
            language,
        } => {
            info!("Opening intel panel for {} ({})", country, language);
            let news = state.news.get_country_news(country).await;
            let panel = build_panel(country, news.as_deref(), *language, &state.translator).await;
            InteractResponse {
                map_style: Some(MapStyle::split()),
                panel_style: Some(PanelStyle::shown()),
                panel: Some(panel),
                figure: Some(render_globe(&state.geo, Some(country), *zoom)),
                ..InteractResponse::state_only(next)
            }
        }
    };

    Json(response)
}

async fn serve_dashboard() -> impl IntoResponse {
    Html(include_str!("../static/dashboard.html"))
}

// ─── Router & server startup ───────────────────────────

pub fn build_router(state: AppState, password: &str) -> Router {
    let api_routes = Router::new()
        .route("/api/countries", get(api_countries))
        .route("/api/languages", get(api_languages))
        .route("/api/globe", get(api_globe))
        .route("/api/news/:country", get(api_news))
        .route("/api/interact", post(api_interact));

    let app = Router::new()
        .route("/", get(serve_dashboard))
        .merge(api_routes)
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    if password.is_empty() {
        app
    } else {
        app.layer(ValidateRequestHeaderLayer::basic("admin", password))
    }
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Ctrl+C received, shutting down gracefully");
    }
}

/// Start the dashboard HTTP server. Returns once Ctrl+C is received.
pub async fn start_dashboard(config: &Config, state: AppState) -> Result<()> {
    let app = build_router(state, &config.dashboard_password);
    let addr = config.listen_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind dashboard to {}", addr))?;

    info!("Dashboard listening on http://{}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Dashboard server error")?;

    Ok(())
}
