//! Notification body formatting.

use ombak_core::observation::Observation;

/// Body for the routine high-wave channels (WhatsApp and SMS share it).
pub fn routine_body(observation: &Observation, extreme_count: u32) -> String {
    format!(
        "HIGH WAVE WARNING\n\
         Status: {}\n\
         Time: {}\n\
         Frame: {}\n\
         Peak height (px): {}\n\
         Consecutive extreme: {}",
        observation.severity.label(),
        observation.captured_at.format("%Y-%m-%d %H:%M:%S"),
        observation.sequence_id,
        observation.height_px,
        extreme_count,
    )
}

/// Body for the tsunami escalation channel. Carries the run length and the
/// configured camera location so responders know where to look.
pub fn tsunami_body(
    observation: &Observation,
    extreme_count: u32,
    location: Option<&str>,
) -> String {
    let location = match location {
        Some(l) if !l.trim().is_empty() => l.trim(),
        _ => "(location not configured)",
    };

    format!(
        "POTENTIAL TSUNAMI WARNING\n\
         \n\
         {} consecutive EXTREME wave observations.\n\
         \n\
         Time: {}\n\
         Location: {}\n\
         Status: {}\n\
         Peak height (px): {}\n\
         Frame: {}\n\
         \n\
         EVACUATE TO HIGH GROUND IMMEDIATELY.\n\
         Contact the local authorities.",
        extreme_count,
        observation.captured_at.format("%Y-%m-%d %H:%M:%S"),
        location,
        observation.severity.label(),
        observation.height_px,
        observation.sequence_id,
    )
}
