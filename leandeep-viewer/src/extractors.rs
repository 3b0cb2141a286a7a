//! Extraction of overlay spans from viewer data.

use leandeep_overlay::TextSpan;

use crate::data::MarkerAnnotation;
use crate::layers::Layer;

/// Spans for the markers of one message whose layer passes `is_active`.
///
/// Each span carries its marker as payload so renderers can reach labels
/// and confidence without a second lookup.
pub fn extract_message_spans<'d>(
    markers: &[&'d MarkerAnnotation],
    is_active: impl Fn(Layer) -> bool,
) -> Vec<TextSpan<Layer, &'d MarkerAnnotation>> {
    markers
        .iter()
        .filter(|marker| is_active(marker.layer))
        .map(|&marker| {
            TextSpan::with_payload(marker.id.clone(), marker.start, marker.end, marker.layer, marker)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{DataSource, MockData};

    #[test]
    fn test_extract_respects_active_layers() {
        let data = MockData;
        let markers = data.markers_for("m1");

        let all = extract_message_spans(&markers, |_| true);
        assert_eq!(all.len(), 3);

        let without_ato = extract_message_spans(&markers, |layer| layer != Layer::Ato);
        let ids: Vec<_> = without_ato.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, ["ann_002", "ann_003"]);
        assert_eq!(without_ato[0].payload.label, "missverstanden");
    }
}
