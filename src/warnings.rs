//! Storage threshold warnings.
//!
//! The collection is rewritten as a single value on every change, so large
//! note counts or payloads make each edit slower. Browsers cap local storage
//! at roughly 5 MiB per origin, which is used as the payload limit here.

/// Note count above which a warning is shown.
pub const NOTE_COUNT_WARNING_THRESHOLD: usize = 1000;

/// Serialized payload size above which a warning is shown.
pub const PAYLOAD_SIZE_WARNING_THRESHOLD: usize = 5 * 1024 * 1024;

/// A warning about the size of the stored collection.
#[derive(Debug, Clone, PartialEq)]
pub enum Warning {
    /// Note count exceeds recommended threshold.
    HighNoteCount { count: usize, threshold: usize },
    /// Serialized collection exceeds the payload threshold.
    LargePayload { size_mb: f64, threshold_mb: f64 },
}

/// Check thresholds and return any warnings.
///
/// # Arguments
/// * `note_count` - Number of notes in the store
/// * `payload_bytes` - Size of the serialized collection
pub fn check_thresholds(note_count: usize, payload_bytes: usize) -> Vec<Warning> {
    let mut warnings = Vec::new();

    if note_count > NOTE_COUNT_WARNING_THRESHOLD {
        warnings.push(Warning::HighNoteCount {
            count: note_count,
            threshold: NOTE_COUNT_WARNING_THRESHOLD,
        });
    }

    if payload_bytes > PAYLOAD_SIZE_WARNING_THRESHOLD {
        warnings.push(Warning::LargePayload {
            size_mb: payload_bytes as f64 / (1024.0 * 1024.0),
            threshold_mb: PAYLOAD_SIZE_WARNING_THRESHOLD as f64 / (1024.0 * 1024.0),
        });
    }

    warnings
}

/// Format a warning for display.
pub fn format_warning(warning: &Warning) -> String {
    match warning {
        Warning::HighNoteCount { count, threshold } => {
            format!(
                "Warning: {} notes exceeds recommended {} - every save rewrites all of them",
                count, threshold
            )
        }
        Warning::LargePayload {
            size_mb,
            threshold_mb,
        } => {
            format!(
                "Warning: stored notes ({:.1}MB) exceed the recommended {:.0}MB",
                size_mb, threshold_mb
            )
        }
    }
}
