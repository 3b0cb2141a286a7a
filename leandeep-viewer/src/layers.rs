//! Analysis layers and their display metadata.

use leandeep_overlay::Category;
use serde::{Deserialize, Serialize};

/// Marker layer, from atomic signals up to meta-diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Layer {
    Ato,
    Sem,
    Clu,
    Mema,
}

impl Layer {
    pub const ALL: [Layer; 4] = [Layer::Ato, Layer::Sem, Layer::Clu, Layer::Mema];

    pub fn as_str(&self) -> &'static str {
        match self {
            Layer::Ato => "ATO",
            Layer::Sem => "SEM",
            Layer::Clu => "CLU",
            Layer::Mema => "MEMA",
        }
    }

    /// Parse a layer code, case-insensitively.
    pub fn from_code(code: &str) -> Option<Layer> {
        Layer::ALL
            .iter()
            .copied()
            .find(|layer| layer.as_str().eq_ignore_ascii_case(code))
    }

    pub fn manifest(&self) -> &'static LayerManifest {
        // LAYER_MANIFESTS is ordered like Layer::ALL
        &LAYER_MANIFESTS[*self as usize]
    }
}

impl std::fmt::Display for Layer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Category for Layer {
    fn name(&self) -> &str {
        self.as_str()
    }

    fn glyph(&self) -> Option<&'static str> {
        Some(self.manifest().pattern.glyph())
    }
}

/// Underline style a layer's highlights are drawn with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnderlinePattern {
    Solid,
    Dashed,
    Dotted,
    Double,
}

impl UnderlinePattern {
    fn glyph(&self) -> &'static str {
        match self {
            UnderlinePattern::Solid => "─",
            UnderlinePattern::Dashed => "╌",
            UnderlinePattern::Dotted => "┈",
            UnderlinePattern::Double => "═",
        }
    }
}

/// Display metadata for a layer.
#[derive(Debug, Clone, Serialize)]
pub struct LayerManifest {
    pub layer: Layer,
    pub description: &'static str,
    pub color: &'static str, // CSS hex color
    pub pattern: UnderlinePattern,
}

/// All layer manifests, in [`Layer::ALL`] order.
pub static LAYER_MANIFESTS: [LayerManifest; 4] = [
    LayerManifest {
        layer: Layer::Ato,
        description: "Atomic Markers",
        color: "#F26B63",
        pattern: UnderlinePattern::Solid,
    },
    LayerManifest {
        layer: Layer::Sem,
        description: "Semantic Context",
        color: "#7C6FF2",
        pattern: UnderlinePattern::Dashed,
    },
    LayerManifest {
        layer: Layer::Clu,
        description: "Behavioral Clusters",
        color: "#3FBCC1",
        pattern: UnderlinePattern::Dotted,
    },
    LayerManifest {
        layer: Layer::Mema,
        description: "Meta-Diagnostics",
        color: "#F2B35C",
        pattern: UnderlinePattern::Double,
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layer_serialization() {
        assert_eq!(serde_json::to_string(&Layer::Mema).unwrap(), "\"MEMA\"");
        let layer: Layer = serde_json::from_str("\"SEM\"").unwrap();
        assert_eq!(layer, Layer::Sem);
    }

    #[test]
    fn test_manifests_follow_layer_order() {
        for layer in Layer::ALL {
            assert_eq!(layer.manifest().layer, layer);
        }
    }

    #[test]
    fn test_from_code() {
        assert_eq!(Layer::from_code("clu"), Some(Layer::Clu));
        assert_eq!(Layer::from_code("ATO"), Some(Layer::Ato));
        assert_eq!(Layer::from_code("XYZ"), None);
    }
}
