use serde::{Deserialize, Serialize};

use crate::translate::Language;

pub const ZOOM_STEP: f64 = 0.2;
pub const ZOOM_MIN: f64 = 0.5;
pub const ZOOM_MAX: f64 = 3.0;
pub const DEFAULT_ZOOM: f64 = 1.0;

/// Clamp to [`ZOOM_MIN`, `ZOOM_MAX`], rounded to tenths so repeated steps don't drift.
pub fn clamp_zoom(zoom: f64) -> f64 {
    if !zoom.is_finite() {
        return DEFAULT_ZOOM;
    }
    ((zoom * 10.0).round() / 10.0).clamp(ZOOM_MIN, ZOOM_MAX)
}

pub fn zoom_in(zoom: f64) -> f64 {
    clamp_zoom(clamp_zoom(zoom) + ZOOM_STEP)
}

pub fn zoom_out(zoom: f64) -> f64 {
    clamp_zoom(clamp_zoom(zoom) - ZOOM_STEP)
}

fn default_zoom() -> f64 {
    DEFAULT_ZOOM
}

/// Client-held view state, round-tripped on every interaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewState {
    #[serde(default)]
    pub selected_country: Option<String>,
    #[serde(default = "default_zoom")]
    pub zoom: f64,
    #[serde(default)]
    pub language: Language,
}

impl Default for ViewState {
    fn default() -> Self {
        ViewState {
            selected_country: None,
            zoom: DEFAULT_ZOOM,
            language: Language::En,
        }
    }
}

/// The control that fired.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Trigger {
    Initial,
    GlobeClick { country: String },
    Close,
    LanguageChanged { language: Language },
    ZoomIn,
    ZoomOut,
}

/// What an interaction resolves to, before any I/O.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Only the projection scale changes.
    Zoom { zoom: f64 },
    /// Collapse the panel and clear the highlight.
    Close { zoom: f64 },
    /// Language switched with nothing selected: collapse, leave the globe alone.
    Collapse { zoom: f64, language: Language },
    /// Fetch news and open the panel for `country`.
    Open {
        country: String,
        zoom: f64,
        language: Language,
    },
}

/// Resolve `trigger` against `state`. Pure.
pub fn plan(state: &ViewState, trigger: &Trigger) -> Action {
    let zoom = clamp_zoom(state.zoom);
    match trigger {
        Trigger::ZoomIn => Action::Zoom {
            zoom: zoom_in(zoom),
        },
        Trigger::ZoomOut => Action::Zoom {
            zoom: zoom_out(zoom),
        },
        Trigger::Initial | Trigger::Close => Action::Close { zoom },
        Trigger::GlobeClick { country } if !country.trim().is_empty() => Action::Open {
            country: country.trim().to_string(),
            zoom,
            language: state.language,
        },
        Trigger::GlobeClick { .. } => Action::Collapse {
            zoom,
            language: state.language,
        },
        Trigger::LanguageChanged { language } => match &state.selected_country {
            Some(country) => Action::Open {
                country: country.clone(),
                zoom,
                language: *language,
            },
            None => Action::Collapse {
                zoom,
                language: *language,
            },
        },
    }
}

/// State after `action`, carrying over what the action leaves untouched.
pub fn apply(state: &ViewState, action: &Action) -> ViewState {
    match action {
        Action::Zoom { zoom } => ViewState {
            zoom: *zoom,
            ..state.clone()
        },
        Action::Close { zoom } => ViewState {
            selected_country: None,
            zoom: *zoom,
            language: state.language,
        },
        Action::Collapse { zoom, language } => ViewState {
            selected_country: None,
            zoom: *zoom,
            language: *language,
        },
        Action::Open {
            country,
            zoom,
            language,
        } => ViewState {
            selected_country: Some(country.clone()),
            zoom: *zoom,
            language: *language,
        },
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapStyle {
    pub width: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PanelStyle {
    pub width: &'static str,
    pub opacity: u8,
}

impl MapStyle {
    pub fn full() -> Self {
        MapStyle { width: "100%" }
    }

    pub fn split() -> Self {
        MapStyle { width: "60%" }
    }
}

impl PanelStyle {
    pub fn hidden() -> Self {
        PanelStyle {
            width: "0%",
            opacity: 0,
        }
    }

    pub fn shown() -> Self {
        PanelStyle {
            width: "40%",
            opacity: 1,
        }
    }
}
