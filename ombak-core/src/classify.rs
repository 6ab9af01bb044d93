//! Peak-height to severity classification.

use crate::observation::{Severity, ThresholdSet};

/// Classifies a peak height against the configured boundaries.
///
/// Starts at [`Severity::Calm`] and walks the boundaries from least to most
/// severe; each boundary the height is strictly below upgrades the label, so
/// the final label is the most severe boundary satisfied. Smaller Y sits
/// higher on the frame and means a taller wave. Total over all inputs,
/// including heights outside the configured range (a frame with no detected
/// lines reports the frame height and classifies as calm).
#[inline]
pub fn classify(height_px: i64, thresholds: &ThresholdSet) -> Severity {
    let mut severity = Severity::Calm;
    for (boundary, upgraded) in thresholds.boundaries() {
        if height_px < boundary {
            severity = upgraded;
        }
    }
    severity
}
