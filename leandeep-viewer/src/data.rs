//! Data sources for the viewer.
//!
//! [`MockData`] serves the fixed transcript, markers and dashboard figures
//! the prototype was built against. Marker offsets are UTF-16 code units,
//! the unit a browser computes selections in.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::layers::Layer;

/// One utterance in a transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub speaker: String,
    pub text: String,
}

/// An annotated finding anchored to a message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerAnnotation {
    pub id: String,
    pub message_id: String,
    pub layer: Layer,
    pub start: usize,
    pub end: usize,
    pub label: String,
    pub description: String,
    pub analysis: String,
    pub confidence: f64,
    pub intervention: String,
}

/// Monthly marker counts per layer for the dashboard chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerActivity {
    pub period: String,
    pub ato: u32,
    pub sem: u32,
    pub clu: u32,
    pub mema: u32,
}

impl LayerActivity {
    pub fn count(&self, layer: Layer) -> u32 {
        match layer {
            Layer::Ato => self.ato,
            Layer::Sem => self.sem,
            Layer::Clu => self.clu,
            Layer::Mema => self.mema,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerStatus {
    Active,
    Warning,
    Idle,
}

/// A dashboard marker card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerSummary {
    pub id: String,
    pub label: String,
    pub layer: Layer,
    pub status: MarkerStatus,
    pub description: String,
}

/// A node of the project structure tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProjectNode {
    Files(Vec<String>),
    Dir(Vec<(String, ProjectNode)>),
}

/// Supplies everything the viewer renders.
pub trait DataSource {
    fn transcript(&self) -> &[Message];
    fn markers(&self) -> &[MarkerAnnotation];
    fn layer_activity(&self) -> &[LayerActivity];
    fn marker_summaries(&self) -> &[MarkerSummary];
    fn project_structure(&self) -> &ProjectNode;

    fn marker(&self, id: &str) -> Option<&MarkerAnnotation> {
        self.markers().iter().find(|m| m.id == id)
    }

    fn marker_summary(&self, id: &str) -> Option<&MarkerSummary> {
        self.marker_summaries().iter().find(|m| m.id == id)
    }

    fn markers_for(&self, message_id: &str) -> Vec<&MarkerAnnotation> {
        self.markers()
            .iter()
            .filter(|m| m.message_id == message_id)
            .collect()
    }
}

/// Fixed in-memory data.
#[derive(Debug, Clone, Copy, Default)]
pub struct MockData;

impl DataSource for MockData {
    fn transcript(&self) -> &[Message] {
        &MOCK_TRANSCRIPT
    }

    fn markers(&self) -> &[MarkerAnnotation] {
        &MOCK_MARKERS
    }

    fn layer_activity(&self) -> &[LayerActivity] {
        &MOCK_ACTIVITY
    }

    fn marker_summaries(&self) -> &[MarkerSummary] {
        &MOCK_SUMMARIES
    }

    fn project_structure(&self) -> &ProjectNode {
        &PROJECT_STRUCTURE
    }
}

fn message(id: &str, speaker: &str, text: &str) -> Message {
    Message {
        id: id.into(),
        speaker: speaker.into(),
        text: text.into(),
    }
}

#[allow(clippy::too_many_arguments)]
fn marker(
    id: &str,
    message_id: &str,
    layer: Layer,
    (start, end): (usize, usize),
    label: &str,
    description: &str,
    analysis: &str,
    confidence: f64,
    intervention: &str,
) -> MarkerAnnotation {
    MarkerAnnotation {
        id: id.into(),
        message_id: message_id.into(),
        layer,
        start,
        end,
        label: label.into(),
        description: description.into(),
        analysis: analysis.into(),
        confidence,
        intervention: intervention.into(),
    }
}

static MOCK_TRANSCRIPT: Lazy<Vec<Message>> = Lazy::new(|| {
    vec![
        message(
            "m1",
            "Client",
            "Ich fühle mich in letzter Zeit oft missverstanden, besonders wenn ich versuche, meine Grenzen klar zu kommunizieren.",
        ),
        message(
            "m2",
            "Analyst",
            "Können Sie ein konkretes Beispiel nennen, in dem dieser Kommunikationsabbruch stattgefunden hat?",
        ),
    ]
});

static MOCK_MARKERS: Lazy<Vec<MarkerAnnotation>> = Lazy::new(|| {
    vec![
        marker(
            "ann_001",
            "m1",
            Layer::Ato,
            (86, 98),
            "Grenzen klar",
            "Selbstbehauptungs-Marker mit defensiver Tonalität.",
            "Der Proband zeigt eine Diskrepanz zwischen verbaler Intention und paraverbalem Rückzug.",
            0.92,
            "Spiegeln der Ambivalenz zwischen Wortwahl und Körpersprache.",
        ),
        marker(
            "ann_002",
            "m1",
            Layer::Mema,
            (35, 49),
            "missverstanden",
            "Kern-Ruptur in der Beziehungsdynamik.",
            "Wiederkehrendes Motiv der Isolation. Hinweis auf tiefsitzende Bindungsunsicherheit.",
            0.85,
            "Validierung des emotionalen Erlebens vor der kognitiven Umstrukturierung.",
        ),
        marker(
            "ann_003",
            "m1",
            Layer::Sem,
            (80, 115),
            "Grenzen kommunizieren",
            "Thematischer Rahmen der Abgrenzung.",
            "Der Wunsch nach Abgrenzung wird als Kommunikationsaufgabe gerahmt.",
            0.74,
            "Konkrete Situationen der Grenzsetzung gemeinsam rekonstruieren.",
        ),
        marker(
            "ann_004",
            "m2",
            Layer::Clu,
            (56, 77),
            "Kommunikationsabbruch",
            "Aufgreifen des Rupturmotivs durch den Analysten.",
            "Die Nachfrage verdichtet das Motiv zu einem benennbaren Ereignis.",
            0.68,
            "Episode zeitlich verorten und Auslöser erfragen.",
        ),
    ]
});

static MOCK_ACTIVITY: Lazy<Vec<LayerActivity>> = Lazy::new(|| {
    [
        ("Jan", 400, 240, 200, 150),
        ("Feb", 300, 139, 221, 200),
        ("Mär", 200, 980, 229, 210),
        ("Apr", 278, 390, 200, 180),
        ("Mai", 189, 480, 218, 250),
    ]
    .iter()
    .map(|&(period, ato, sem, clu, mema)| LayerActivity {
        period: period.into(),
        ato,
        sem,
        clu,
        mema,
    })
    .collect()
});

static MOCK_SUMMARIES: Lazy<Vec<MarkerSummary>> = Lazy::new(|| {
    [
        ("m1", "Integritäts-Check", Layer::Ato, MarkerStatus::Active, "Prüfung der Datenkonsistenz über alle Knoten."),
        ("m2", "Semantischer Fokus", Layer::Sem, MarkerStatus::Warning, "Abweichung in der Kontext-Zuordnung erkannt."),
        ("m3", "Cluster-Validierung", Layer::Clu, MarkerStatus::Active, "Optimierung der Gruppierungs-Vektoren."),
        ("m4", "Memory-Sync", Layer::Mema, MarkerStatus::Idle, "Synchronisation der Langzeit-Speicher-Module."),
    ]
    .iter()
    .map(|&(id, label, layer, status, description)| MarkerSummary {
        id: id.into(),
        label: label.into(),
        layer,
        status,
        description: description.into(),
    })
    .collect()
});

static PROJECT_STRUCTURE: Lazy<ProjectNode> = Lazy::new(|| {
    fn files(names: &[&str]) -> ProjectNode {
        ProjectNode::Files(names.iter().map(|n| n.to_string()).collect())
    }
    fn dir(children: Vec<(&str, ProjectNode)>) -> ProjectNode {
        ProjectNode::Dir(
            children
                .into_iter()
                .map(|(name, node)| (name.to_string(), node))
                .collect(),
        )
    }

    dir(vec![(
        "src/",
        dir(vec![
            (
                "components/",
                dir(vec![
                    (
                        "analysis/",
                        files(&["MarkerCard.ts", "MarkerList.ts", "TranscriptView.ts"]),
                    ),
                    ("layout/", files(&["TopBar.ts", "LeftSidebar.ts", "RightPanel.ts"])),
                ]),
            ),
            ("lib/", files(&["api.ts", "layers.ts", "chat-parser.ts"])),
            ("context/", files(&["AppContext.tsx"])),
        ]),
    )])
});
