//! Explicit viewer state and the actions that transform it.
//!
//! State is an owned value. Event handlers map browser events to an
//! [`Action`], apply it, and re-render from the returned state; nothing is
//! shared or broadcast.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::data::DataSource;
use crate::layers::Layer;

/// Top-level page of the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Route {
    Dashboard,
    Analyze,
    Conversation,
    Persona,
    Developers,
}

impl Route {
    pub const ALL: [Route; 5] = [
        Route::Dashboard,
        Route::Analyze,
        Route::Conversation,
        Route::Persona,
        Route::Developers,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            Route::Dashboard => "Übersicht",
            Route::Analyze => "Analyse",
            Route::Conversation => "Konversation",
            Route::Persona => "Persona",
            Route::Developers => "Entwickler",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Route::Dashboard => "layout-dashboard",
            Route::Analyze => "zap",
            Route::Conversation => "message-square",
            Route::Persona => "user-circle",
            Route::Developers => "code",
        }
    }
}

impl Default for Route {
    fn default() -> Self {
        Route::Conversation
    }
}

/// Which layers are shown. All layers start enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerSet {
    #[serde(rename = "ATO")]
    pub ato: bool,
    #[serde(rename = "SEM")]
    pub sem: bool,
    #[serde(rename = "CLU")]
    pub clu: bool,
    #[serde(rename = "MEMA")]
    pub mema: bool,
}

impl Default for LayerSet {
    fn default() -> Self {
        LayerSet {
            ato: true,
            sem: true,
            clu: true,
            mema: true,
        }
    }
}

impl LayerSet {
    pub fn contains(&self, layer: Layer) -> bool {
        match layer {
            Layer::Ato => self.ato,
            Layer::Sem => self.sem,
            Layer::Clu => self.clu,
            Layer::Mema => self.mema,
        }
    }

    fn slot(&mut self, layer: Layer) -> &mut bool {
        match layer {
            Layer::Ato => &mut self.ato,
            Layer::Sem => &mut self.sem,
            Layer::Clu => &mut self.clu,
            Layer::Mema => &mut self.mema,
        }
    }

    pub fn toggled(mut self, layer: Layer) -> Self {
        let slot = self.slot(layer);
        *slot = !*slot;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ViewState {
    pub route: Route,
    pub active_layers: LayerSet,
    pub selected_marker: Option<String>,
    pub structure_open: bool,
}

/// A user interaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Action {
    Navigate(Route),
    ToggleLayer(Layer),
    SelectMarker(String),
    ClearSelection,
    OpenStructure,
    CloseStructure,
    ToggleStructure,
    /// Escape key or a click outside every interactive region.
    Dismiss,
}

impl ViewState {
    /// State after `action`. Selecting a marker `source` doesn't know is
    /// ignored. On the dashboard the selectable markers are its cards.
    pub fn apply(&self, action: &Action, source: &dyn DataSource) -> ViewState {
        let mut next = self.clone();
        match action {
            Action::Navigate(route) => {
                next.route = *route;
                next.selected_marker = None;
            }
            Action::ToggleLayer(layer) => {
                next.active_layers = self.active_layers.toggled(*layer);
            }
            Action::SelectMarker(id) => {
                let known = match self.route {
                    Route::Dashboard => source.marker_summary(id).is_some(),
                    _ => source.marker(id).is_some(),
                };
                if known {
                    next.selected_marker = Some(id.clone());
                } else {
                    warn!(marker = %id, "ignoring selection of unknown marker");
                }
            }
            Action::ClearSelection => next.selected_marker = None,
            Action::OpenStructure => next.structure_open = true,
            Action::CloseStructure => next.structure_open = false,
            Action::ToggleStructure => next.structure_open = !self.structure_open,
            Action::Dismiss => {
                next.selected_marker = None;
                next.structure_open = false;
            }
        }

        if next != *self {
            debug!(?action, "view state changed");
        }
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::MockData;

    #[test]
    fn test_default_state() {
        let state = ViewState::default();
        assert_eq!(state.route, Route::Conversation);
        assert!(Layer::ALL.iter().all(|&l| state.active_layers.contains(l)));
        assert!(state.selected_marker.is_none());
        assert!(!state.structure_open);
    }

    #[test]
    fn test_toggle_layer_twice_restores() {
        let state = ViewState::default();
        let off = state.apply(&Action::ToggleLayer(Layer::Sem), &MockData);
        assert!(!off.active_layers.contains(Layer::Sem));
        assert!(off.active_layers.contains(Layer::Ato));
        let on = off.apply(&Action::ToggleLayer(Layer::Sem), &MockData);
        assert_eq!(on, state);
    }

    #[test]
    fn test_select_known_and_unknown_marker() {
        let state = ViewState::default().apply(&Action::SelectMarker("ann_001".into()), &MockData);
        assert_eq!(state.selected_marker.as_deref(), Some("ann_001"));

        let unchanged = state.apply(&Action::SelectMarker("missing".into()), &MockData);
        assert_eq!(unchanged, state);
    }

    #[test]
    fn test_select_dashboard_card() {
        let dashboard = ViewState::default().apply(&Action::Navigate(Route::Dashboard), &MockData);
        let state = dashboard.apply(&Action::SelectMarker("m1".into()), &MockData);
        assert_eq!(state.selected_marker.as_deref(), Some("m1"));

        // transcript annotations are not cards
        let unchanged = dashboard.apply(&Action::SelectMarker("ann_001".into()), &MockData);
        assert!(unchanged.selected_marker.is_none());

        let conversation = ViewState::default().apply(&Action::SelectMarker("m1".into()), &MockData);
        assert!(conversation.selected_marker.is_none());
    }

    #[test]
    fn test_dismiss_clears_selection_and_modal() {
        let state = ViewState::default()
            .apply(&Action::SelectMarker("ann_002".into()), &MockData)
            .apply(&Action::OpenStructure, &MockData);
        assert!(state.structure_open);

        let dismissed = state.apply(&Action::Dismiss, &MockData);
        assert!(dismissed.selected_marker.is_none());
        assert!(!dismissed.structure_open);
    }

    #[test]
    fn test_navigate_clears_selection() {
        let state = ViewState::default()
            .apply(&Action::SelectMarker("ann_002".into()), &MockData)
            .apply(&Action::Navigate(Route::Dashboard), &MockData);
        assert_eq!(state.route, Route::Dashboard);
        assert!(state.selected_marker.is_none());
    }

    #[test]
    fn test_toggle_structure() {
        let open = ViewState::default().apply(&Action::ToggleStructure, &MockData);
        assert!(open.structure_open);
        let closed = open.apply(&Action::ToggleStructure, &MockData);
        assert!(!closed.structure_open);
    }

    #[test]
    fn test_action_json_shape() {
        let action: Action =
            serde_json::from_str(r#"{"type":"toggle_layer","value":"CLU"}"#).unwrap();
        assert_eq!(action, Action::ToggleLayer(Layer::Clu));
        let action: Action = serde_json::from_str(r#"{"type":"dismiss"}"#).unwrap();
        assert_eq!(action, Action::Dismiss);
    }
}
