//! Plotly choropleth figure for the orthographic globe.
//!
//! The server owns the whole figure description; the page hands it to
//! `Plotly.react` untouched. Field names follow plotly.js attribute names.

use serde::Serialize;

use crate::geo::GeoDataset;

pub const BASE_Z: f64 = 0.3;
pub const HIGHLIGHT_Z: f64 = 1.0;

pub const BASE_COLOR: &str = "#004466";
pub const HIGHLIGHT_COLOR: &str = "#00ffff";
pub const TITLE: &str = "NEXUS: GLOBAL AI SENTINEL";
const FONT_FAMILY: &str = "'GoldenEye', 'Share Tech Mono', monospace";

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Figure {
    pub data: Vec<ChoroplethTrace>,
    pub layout: Layout,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ChoroplethTrace {
    #[serde(rename = "type")]
    pub trace_type: &'static str,
    pub locations: Vec<String>,
    pub z: Vec<f64>,
    pub text: Vec<String>,
    pub zmin: f64,
    pub zmax: f64,
    pub colorscale: Vec<(f64, &'static str)>,
    pub autocolorscale: bool,
    pub showscale: bool,
    pub marker: Marker,
    pub hovertemplate: &'static str,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Marker {
    pub line: Line,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Line {
    pub color: &'static str,
    pub width: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Font {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u32>,
    pub color: &'static str,
    pub family: &'static str,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Title {
    pub text: &'static str,
    pub x: f64,
    pub y: f64,
    pub xanchor: &'static str,
    pub yanchor: &'static str,
    pub font: Font,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Rotation {
    pub lon: f64,
    pub lat: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Projection {
    #[serde(rename = "type")]
    pub projection_type: &'static str,
    pub scale: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation: Option<Rotation>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Geo {
    pub showframe: bool,
    pub showcoastlines: bool,
    pub projection: Projection,
    pub showland: bool,
    pub landcolor: &'static str,
    pub showocean: bool,
    pub oceancolor: &'static str,
    pub bgcolor: &'static str,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Margin {
    pub r: u32,
    pub l: u32,
    pub b: u32,
    pub t: u32,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct HoverLabel {
    pub bgcolor: &'static str,
    pub font: Font,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Layout {
    pub title: Title,
    pub paper_bgcolor: &'static str,
    pub clickmode: &'static str,
    pub uirevision: &'static str,
    pub geo: Geo,
    pub margin: Margin,
    pub autosize: bool,
    pub hoverlabel: HoverLabel,
}

/// Per-row z values: highlight on the first row named `selected`, base elsewhere.
pub fn highlight_values(geo: &GeoDataset, selected: Option<&str>) -> Vec<f64> {
    let hit = selected.and_then(|name| geo.index_of(name));
    (0..geo.len())
        .map(|i| if Some(i) == hit { HIGHLIGHT_Z } else { BASE_Z })
        .collect()
}

/// Render the globe for a selection and zoom level.
pub fn render_globe(geo: &GeoDataset, selected: Option<&str>, zoom: f64) -> Figure {
    let rotation = selected
        .and_then(|name| geo.get(name))
        .and_then(|c| c.centroid)
        .map(|c| Rotation {
            lon: c.lon,
            lat: c.lat,
        });

    let trace = ChoroplethTrace {
        trace_type: "choropleth",
        locations: geo.countries().iter().map(|c| c.code.clone()).collect(),
        z: highlight_values(geo, selected),
        text: geo.countries().iter().map(|c| c.name.clone()).collect(),
        zmin: 0.0,
        zmax: 1.0,
        colorscale: vec![
            (0.0, BASE_COLOR),
            (0.5, BASE_COLOR),
            (0.6, HIGHLIGHT_COLOR),
            (1.0, HIGHLIGHT_COLOR),
        ],
        autocolorscale: false,
        showscale: false,
        marker: Marker {
            line: Line {
                color: "#00cccc",
                width: 0.5,
            },
        },
        hovertemplate: "<b>%{text}</b><extra></extra>",
    };

    let layout = Layout {
        title: Title {
            text: TITLE,
            x: 0.5,
            y: 0.95,
            xanchor: "center",
            yanchor: "top",
            font: Font {
                size: Some(32),
                color: HIGHLIGHT_COLOR,
                family: FONT_FAMILY,
            },
        },
        paper_bgcolor: "black",
        clickmode: "event+select",
        uirevision: "constant",
        geo: Geo {
            showframe: false,
            showcoastlines: false,
            projection: Projection {
                projection_type: "orthographic",
                scale: zoom,
                rotation,
            },
            showland: true,
            landcolor: "#002233",
            showocean: true,
            oceancolor: "black",
            bgcolor: "black",
        },
        margin: Margin {
            r: 0,
            l: 0,
            b: 0,
            t: 80,
        },
        autosize: true,
        hoverlabel: HoverLabel {
            bgcolor: "black",
            font: Font {
                size: Some(18),
                color: HIGHLIGHT_COLOR,
                family: FONT_FAMILY,
            },
        },
    };

    Figure {
        data: vec![trace],
        layout,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::fixtures::SAMPLE_CSV;

    fn geo() -> GeoDataset {
        GeoDataset::from_csv(SAMPLE_CSV).unwrap()
    }

    #[test]
    fn test_no_selection_is_all_base() {
        let z = highlight_values(&geo(), None);
        assert_eq!(z.len(), 10);
        assert!(z.iter().all(|&v| v == BASE_Z));
    }

    #[test]
    fn test_selection_highlights_single_row() {
        let g = geo();
        let z = highlight_values(&g, Some("Japan"));
        let idx = g.index_of("Japan").unwrap();
        assert_eq!(z[idx], HIGHLIGHT_Z);
        assert_eq!(z.iter().filter(|&&v| v == HIGHLIGHT_Z).count(), 1);
    }

    #[test]
    fn test_unknown_selection_is_all_base() {
        let z = highlight_values(&geo(), Some("Atlantis"));
        assert!(z.iter().all(|&v| v == BASE_Z));
    }

    #[test]
    fn test_figure_json_shape() {
        let fig = render_globe(&geo(), Some("China"), 1.4);
        let json = serde_json::to_value(&fig).unwrap();

        let trace = &json["data"][0];
        assert_eq!(trace["type"], "choropleth");
        assert_eq!(trace["locations"][2], "CHN");
        assert_eq!(trace["text"][2], "China");
        assert_eq!(trace["z"][2], 1.0);
        assert_eq!(trace["colorscale"][2][0], 0.6);
        assert_eq!(trace["colorscale"][2][1], "#00ffff");
        assert_eq!(trace["marker"]["line"]["width"], 0.5);

        let layout = &json["layout"];
        assert_eq!(layout["title"]["text"], TITLE);
        assert_eq!(layout["uirevision"], "constant");
        assert_eq!(layout["geo"]["projection"]["type"], "orthographic");
        assert_eq!(layout["geo"]["projection"]["scale"], 1.4);
        assert_eq!(layout["geo"]["projection"]["rotation"]["lon"], 104.1954);
    }

    #[test]
    fn test_rotation_omitted_without_centroid() {
        let fig = render_globe(&geo(), Some("Afghanistan"), 1.0);
        let json = serde_json::to_value(&fig).unwrap();
        assert!(json["layout"]["geo"]["projection"].get("rotation").is_none());

        let fig = render_globe(&geo(), None, 1.0);
        assert!(fig.layout.geo.projection.rotation.is_none());
    }
}
