//! Presentation model handed to the rendering collaborators.
//!
//! Everything here is derived from a [`Snapshot`]: chart series for the
//! active chart kind, the detail panel for the selection, the tile source for
//! the active layer and the layout decision driven by `fullscreen`.

use crate::config::AppConfig;
use crate::data::Bounds;
use crate::state::{Notice, Snapshot};
use crate::types::{Category, Condition, RecordId, RecordView};
use crate::view::{ChartKind, TileLayer};
use geojson::{feature, Feature, FeatureCollection, Geometry, JsonObject, Value};
use serde::Serialize;
use tracing::warn;

const FALLBACK_COLOR: [u8; 4] = [128, 128, 128, 255];

#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    pub layout: Layout,
    pub map: MapView,
    pub chart: Option<ChartView>,
    pub detail: Option<DetailView>,
    pub notice: Option<Notice>,
}

/// Fullscreen hides the side panel and gives the map the whole page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Layout {
    pub map_expanded: bool,
    pub side_panel_visible: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct MapView {
    pub bounds: Option<Bounds>,
    pub tiles: TileSource,
    pub markers: Vec<Marker>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TileSource {
    pub layer: TileLayer,
    pub url: String,
    pub attribution: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Marker {
    pub id: RecordId,
    pub name: String,
    pub category: Category,
    pub latitude: f64,
    pub longitude: f64,
    pub color: [u8; 4],
    pub selected: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartStyle {
    Bar,
    Pie,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChartView {
    pub kind: ChartKind,
    pub style: ChartStyle,
    pub title: &'static str,
    pub labels: Vec<&'static str>,
    pub values: Vec<usize>,
    pub colors: Vec<[u8; 4]>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DetailView {
    pub id: RecordId,
    pub title: String,
    pub fields: Vec<DetailField>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetailField {
    pub label: &'static str,
    pub value: String,
}

pub fn dashboard_view(config: &AppConfig, bounds: Option<Bounds>, snapshot: &Snapshot) -> DashboardView {
    let fullscreen = snapshot.view_mode.fullscreen;
    let layout = Layout {
        map_expanded: fullscreen,
        side_panel_visible: !fullscreen,
    };

    let layer = snapshot.view_mode.tile_layer;
    let source = config.tiles.source(layer);
    let selected = snapshot.selection.id();

    let markers = snapshot
        .filtered_subset
        .iter()
        .map(|r| Marker {
            id: r.id,
            name: r.name.clone(),
            category: r.category,
            latitude: r.latitude,
            longitude: r.longitude,
            color: hex_to_rgba(config.palette.category(r.category)),
            selected: selected == Some(r.id),
        })
        .collect();

    let (chart, detail) = if layout.side_panel_visible {
        (
            Some(chart_view(config, snapshot)),
            snapshot.selected().map(detail_view),
        )
    } else {
        (None, None)
    };

    DashboardView {
        layout,
        map: MapView {
            bounds,
            tiles: TileSource {
                layer,
                url: source.url.clone(),
                attribution: source.attribution.clone(),
            },
            markers,
        },
        chart,
        detail,
        notice: snapshot.notice.clone(),
    }
}

pub fn chart_view(config: &AppConfig, snapshot: &Snapshot) -> ChartView {
    let aggregates = &snapshot.aggregates;
    match snapshot.view_mode.chart_kind {
        ChartKind::Distribution => ChartView {
            kind: ChartKind::Distribution,
            style: ChartStyle::Bar,
            title: "Facilities by Category",
            labels: Category::ALL.iter().map(|c| c.label()).collect(),
            values: Category::ALL.iter().map(|&c| aggregates.category(c)).collect(),
            colors: Category::ALL
                .iter()
                .map(|&c| hex_to_rgba(config.palette.category(c)))
                .collect(),
        },
        ChartKind::Condition => ChartView {
            kind: ChartKind::Condition,
            style: ChartStyle::Pie,
            title: "Facilities by Condition",
            labels: Condition::ALL.iter().map(|c| c.label()).collect(),
            values: Condition::ALL.iter().map(|&c| aggregates.condition(c)).collect(),
            colors: Condition::ALL
                .iter()
                .map(|&c| hex_to_rgba(config.palette.condition(c)))
                .collect(),
        },
    }
}

pub fn detail_view(record: &RecordView) -> DetailView {
    let unknown = || "Unknown".to_string();
    let attrs = &record.attributes;
    DetailView {
        id: record.id,
        title: record.name.clone(),
        fields: vec![
            DetailField {
                label: "Category",
                value: record.category.to_string(),
            },
            DetailField {
                label: "Location",
                value: format!("{:.4}, {:.4}", record.latitude, record.longitude),
            },
            DetailField {
                label: "Capacity",
                value: attrs.capacity.map(|c| c.to_string()).unwrap_or_else(unknown),
            },
            DetailField {
                label: "Year Built",
                value: attrs.year_built.map(|y| y.to_string()).unwrap_or_else(unknown),
            },
            DetailField {
                label: "Condition",
                value: attrs.condition.label().to_string(),
            },
        ],
    }
}

/// GeoJSON points for the visible records.
pub fn feature_collection(snapshot: &Snapshot) -> FeatureCollection {
    let features = snapshot
        .filtered_subset
        .iter()
        .map(|r| {
            let mut properties = JsonObject::new();
            properties.insert("name".to_string(), r.name.clone().into());
            properties.insert("category".to_string(), r.category.label().into());
            properties.insert("condition".to_string(), r.attributes.condition.label().into());
            properties.insert("capacity".to_string(), r.attributes.capacity.into());
            properties.insert("year_built".to_string(), r.attributes.year_built.into());
            properties.insert(
                "selected".to_string(),
                (snapshot.selection.id() == Some(r.id)).into(),
            );

            Feature {
                bbox: None,
                geometry: Some(Geometry::new(Value::Point(vec![r.longitude, r.latitude]))),
                id: Some(feature::Id::Number(r.id.0.into())),
                properties: Some(properties),
                foreign_members: None,
            }
        })
        .collect();

    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}

fn hex_to_rgba(hex: &str) -> [u8; 4] {
    let digits = hex.trim_start_matches('#');
    let channel = |i: usize| {
        digits
            .get(i..i + 2)
            .and_then(|s| u8::from_str_radix(s, 16).ok())
    };
    match (digits.len(), channel(0), channel(2), channel(4)) {
        (6, Some(r), Some(g), Some(b)) => [r, g, b, 255],
        _ => {
            warn!(color = hex, "invalid palette colour, using grey");
            FALLBACK_COLOR
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Dataset;
    use crate::state::{DashboardState, Event};

    fn snapshot_after(events: &[Event]) -> (Dataset, Snapshot) {
        let dataset = Dataset::builtin().unwrap();
        let mut state = DashboardState::default();
        for event in events {
            state = state.reduce(&dataset, event.clone()).unwrap().state;
        }
        let snapshot = state.snapshot(&dataset);
        (dataset, snapshot)
    }

    #[test]
    fn hex_colours_parse_or_fall_back() {
        assert_eq!(hex_to_rgba("#3498db"), [0x34, 0x98, 0xdb, 255]);
        assert_eq!(hex_to_rgba("1abc9c"), [0x1a, 0xbc, 0x9c, 255]);
        assert_eq!(hex_to_rgba("#fff"), FALLBACK_COLOR);
        assert_eq!(hex_to_rgba("#zzzzzz"), FALLBACK_COLOR);
    }

    #[test]
    fn chart_follows_chart_kind() {
        let config = AppConfig::default();
        let (_, snapshot) = snapshot_after(&[Event::SetFilter(Category::Hospital)]);
        let chart = chart_view(&config, &snapshot);
        assert_eq!(chart.style, ChartStyle::Bar);
        assert_eq!(chart.labels, vec!["Hospital", "School"]);
        assert_eq!(chart.values, vec![6, 0]);

        let (_, snapshot) = snapshot_after(&[Event::ToggleChartKind]);
        let chart = chart_view(&config, &snapshot);
        assert_eq!(chart.style, ChartStyle::Pie);
        assert_eq!(chart.labels, vec!["Good", "Fair", "Poor"]);
        assert_eq!(chart.values.iter().sum::<usize>(), 10);
    }

    #[test]
    fn detail_shows_unknown_attributes() {
        let (_, snapshot) = snapshot_after(&[Event::Select(RecordId(9))]);
        let detail = detail_view(snapshot.selected().unwrap());
        let capacity = detail.fields.iter().find(|f| f.label == "Capacity").unwrap();
        assert_eq!(capacity.value, "Unknown");
        assert_eq!(detail.title, "Community Secondary School Boje");
    }

    #[test]
    fn fullscreen_hides_side_panel() {
        let config = AppConfig::default();
        let (dataset, snapshot) = snapshot_after(&[
            Event::Select(RecordId(1)),
            Event::ToggleFullscreen,
            // First ticket issued by a fresh state
            Event::FullscreenResolved {
                ticket: crate::view::FullscreenTicket {
                    request: crate::view::FullscreenRequest::Enter,
                    id: 0,
                },
                outcome: Ok(()),
            },
        ]);
        let view = dashboard_view(&config, dataset.bounds(), &snapshot);
        assert!(view.layout.map_expanded);
        assert!(!view.layout.side_panel_visible);
        assert!(view.chart.is_none());
        assert!(view.detail.is_none());
        assert_eq!(view.map.markers.len(), 10);
        assert!(view.map.markers.iter().any(|m| m.selected && m.id == RecordId(1)));
    }

    #[test]
    fn tile_source_follows_layer() {
        let config = AppConfig::default();
        let (dataset, snapshot) = snapshot_after(&[Event::ToggleTileLayer]);
        let view = dashboard_view(&config, dataset.bounds(), &snapshot);
        assert_eq!(view.map.tiles.layer, TileLayer::Satellite);
        assert_eq!(view.map.tiles.url, config.tiles.satellite.url);
    }

    #[test]
    fn features_cover_filtered_subset() {
        let (_, snapshot) = snapshot_after(&[Event::SetFilter(Category::School)]);
        let collection = feature_collection(&snapshot);
        assert_eq!(collection.features.len(), 4);
        let first = &collection.features[0];
        assert_eq!(first.property("category").and_then(|v| v.as_str()), Some("School"));
    }
}
