//! Pure rendering of [`ViewState`] into a serializable view model.
//!
//! The presentation layer applies the model; it never reads state itself.

use leandeep_overlay::{render_markup, MarkupOptions, OffsetUnit, ResolveOptions, Resolver};
use serde::Serialize;

use crate::data::{DataSource, LayerActivity, MarkerStatus, MarkerSummary, ProjectNode};
use crate::errors::ViewError;
use crate::extractors::extract_message_spans;
use crate::layers::{Layer, UnderlinePattern};
use crate::state::{Route, ViewState};

/// Marker offsets in the transcript are browser string indices.
pub const TRANSCRIPT_UNIT: OffsetUnit = OffsetUnit::Utf16;

#[derive(Debug, Clone, Serialize)]
pub struct ViewModel {
    pub nav: Vec<NavItem>,
    pub layer_toggles: Vec<LayerToggle>,
    /// Present on the conversation route.
    pub transcript: Option<Vec<MessageView>>,
    pub details: Option<DetailsPanel>,
    pub structure: Option<Vec<TreeRow>>,
    /// Present on the dashboard route.
    pub dashboard: Option<DashboardView>,
    /// Selected dashboard card, while its layer is active.
    pub card_panel: Option<MarkerCard>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NavItem {
    pub route: Route,
    pub title: &'static str,
    pub icon: &'static str,
    pub active: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct LayerToggle {
    pub layer: Layer,
    pub description: &'static str,
    pub color: &'static str,
    pub pattern: UnderlinePattern,
    pub active: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct MessageView {
    pub id: String,
    pub speaker: String,
    pub segments: Vec<SegmentView>,
    /// Inline markup of the whole message.
    pub html: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SegmentView {
    pub text: String,
    /// Covering markers, widest first.
    pub marker_ids: Vec<String>,
    pub layers: Vec<Layer>,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetailsPanel {
    pub marker_id: String,
    pub layer: Layer,
    pub color: &'static str,
    pub label: String,
    pub description: String,
    pub analysis: String,
    pub confidence_percent: u32,
    pub intervention: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TreeRowKind {
    Dir,
    File,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreeRow {
    pub depth: usize,
    pub name: String,
    pub kind: TreeRowKind,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    pub series: Vec<LayerActivity>,
    /// Largest count in `series` across active layers, for chart scaling.
    pub series_max: u32,
    pub markers: Vec<MarkerCard>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MarkerCard {
    pub id: String,
    pub label: String,
    pub layer: Layer,
    pub color: &'static str,
    pub status: MarkerStatus,
    pub description: String,
}

/// Render `state` against `source`.
pub fn render(state: &ViewState, source: &dyn DataSource) -> Result<ViewModel, ViewError> {
    let nav = Route::ALL
        .iter()
        .map(|&route| NavItem {
            route,
            title: route.title(),
            icon: route.icon(),
            active: route == state.route,
        })
        .collect();

    let layer_toggles = Layer::ALL
        .iter()
        .map(|layer| {
            let manifest = layer.manifest();
            LayerToggle {
                layer: *layer,
                description: manifest.description,
                color: manifest.color,
                pattern: manifest.pattern,
                active: state.active_layers.contains(*layer),
            }
        })
        .collect();

    let transcript = match state.route {
        Route::Conversation => Some(render_transcript(state, source)?),
        _ => None,
    };
    let (dashboard, card_panel) = match state.route {
        Route::Dashboard => (
            Some(render_dashboard(state, source)),
            render_card_panel(state, source),
        ),
        _ => (None, None),
    };

    Ok(ViewModel {
        nav,
        layer_toggles,
        transcript,
        details: render_details(state, source),
        structure: if state.structure_open {
            Some(flatten_tree(source.project_structure()))
        } else {
            None
        },
        dashboard,
        card_panel,
    })
}

fn render_transcript(
    state: &ViewState,
    source: &dyn DataSource,
) -> Result<Vec<MessageView>, ViewError> {
    // one segment per interval, so every listed marker covers its segment
    let resolver = Resolver::new(
        ResolveOptions::default()
            .with_unit(TRANSCRIPT_UNIT)
            .with_merge(false),
    );
    let markup = MarkupOptions {
        selected: state.selected_marker.clone(),
        ..MarkupOptions::default().with_unit(TRANSCRIPT_UNIT)
    };

    source
        .transcript()
        .iter()
        .map(|message| {
            let markers = source.markers_for(&message.id);
            let spans = extract_message_spans(&markers, |layer| state.active_layers.contains(layer));
            let overlay_error = |source| ViewError::Overlay {
                message: message.id.clone(),
                source,
            };
            let resolution = resolver
                .resolve(&message.text, &spans)
                .map_err(overlay_error)?;
            let html = render_markup(&message.text, &spans, &markup).map_err(overlay_error)?;

            let segments = resolution
                .segments
                .iter()
                .map(|segment| {
                    let marker_ids: Vec<String> = segment
                        .span_indices
                        .iter()
                        .map(|&i| spans[i].id.clone())
                        .collect();
                    SegmentView {
                        text: segment.text.to_string(),
                        selected: state
                            .selected_marker
                            .as_ref()
                            .map_or(false, |id| marker_ids.contains(id)),
                        marker_ids,
                        layers: segment.categories.clone(),
                    }
                })
                .collect();

            Ok(MessageView {
                id: message.id.clone(),
                speaker: message.speaker.clone(),
                segments,
                html,
            })
        })
        .collect()
}

fn render_details(state: &ViewState, source: &dyn DataSource) -> Option<DetailsPanel> {
    let marker = source.marker(state.selected_marker.as_deref()?)?;
    if !state.active_layers.contains(marker.layer) {
        return None;
    }

    Some(DetailsPanel {
        marker_id: marker.id.clone(),
        layer: marker.layer,
        color: marker.layer.manifest().color,
        label: marker.label.clone(),
        description: marker.description.clone(),
        analysis: marker.analysis.clone(),
        confidence_percent: (marker.confidence * 100.0).round() as u32,
        intervention: marker.intervention.clone(),
    })
}

fn render_dashboard(state: &ViewState, source: &dyn DataSource) -> DashboardView {
    let series = source.layer_activity().to_vec();
    let active: Vec<Layer> = Layer::ALL
        .iter()
        .copied()
        .filter(|&layer| state.active_layers.contains(layer))
        .collect();
    let series_max = series
        .iter()
        .flat_map(|point| active.iter().map(move |&layer| point.count(layer)))
        .max()
        .unwrap_or(0);

    let markers = source
        .marker_summaries()
        .iter()
        .filter(|summary| state.active_layers.contains(summary.layer))
        .map(card)
        .collect();

    DashboardView {
        series,
        series_max,
        markers,
    }
}

fn render_card_panel(state: &ViewState, source: &dyn DataSource) -> Option<MarkerCard> {
    let summary = source.marker_summary(state.selected_marker.as_deref()?)?;
    if !state.active_layers.contains(summary.layer) {
        return None;
    }
    Some(card(summary))
}

fn card(summary: &MarkerSummary) -> MarkerCard {
    MarkerCard {
        id: summary.id.clone(),
        label: summary.label.clone(),
        layer: summary.layer,
        color: summary.layer.manifest().color,
        status: summary.status,
        description: summary.description.clone(),
    }
}

/// Depth-first rows of the project tree, directories before their contents.
pub fn flatten_tree(root: &ProjectNode) -> Vec<TreeRow> {
    let mut rows = Vec::new();
    flatten_into(root, 0, &mut rows);
    rows
}

fn flatten_into(node: &ProjectNode, depth: usize, rows: &mut Vec<TreeRow>) {
    match node {
        ProjectNode::Files(files) => rows.extend(files.iter().map(|name| TreeRow {
            depth,
            name: name.clone(),
            kind: TreeRowKind::File,
        })),
        ProjectNode::Dir(children) => {
            for (name, child) in children {
                rows.push(TreeRow {
                    depth,
                    name: name.clone(),
                    kind: TreeRowKind::Dir,
                });
                flatten_into(child, depth + 1, rows);
            }
        }
    }
}
