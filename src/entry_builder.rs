// Lumen Journal - Entry Builder
// Assembles a canonical JournalEntry from an extracted record plus its
// normalized fields, enforcing the validation invariants: non-empty content,
// content length ceiling, and complete in-range coordinates.

use uuid::Uuid;

use crate::error::ImportError;
use crate::journal_entry::{Activity, JournalEntry, Mood, SpatialPlacement, VisualizationCategory};
use crate::row_extractor::LegacyEntry;

/// Maximum content length in characters
pub const MAX_CONTENT_LENGTH: usize = 10_000;

/// Build a validated entry. Content is trimmed; tags are trimmed,
/// lowercased, and emptied of blanks while keeping their original order
/// (repeats are left to downstream consumers).
pub fn build(
    record: &LegacyEntry,
    mood: Mood,
    activity: Activity,
    category: VisualizationCategory,
    placement: SpatialPlacement,
) -> Result<JournalEntry, ImportError> {
    let content = record.content.trim();
    if content.is_empty() {
        return Err(ImportError::EmptyContent);
    }

    let length = content.chars().count();
    if length > MAX_CONTENT_LENGTH {
        return Err(ImportError::ContentTooLong { length });
    }

    validate_location(record.latitude, record.longitude)?;

    let tags: Vec<String> = record
        .tags
        .iter()
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect();

    let entry = JournalEntry {
        id: Uuid::new_v4().to_string(),
        timestamp: record.timestamp,
        content: content.to_string(),
        latitude: record.latitude,
        longitude: record.longitude,
        tags,
        mood,
        activity,
        visualization_category: category,
        spatial_placement: placement,
    };

    // Blank content must never survive assembly, whatever path produced it
    if entry.content.is_empty() {
        return Err(ImportError::EmptyContent);
    }

    Ok(entry)
}

fn validate_location(latitude: Option<f64>, longitude: Option<f64>) -> Result<(), ImportError> {
    match (latitude, longitude) {
        (None, None) => Ok(()),
        (Some(_), None) => Err(ImportError::InvalidLocation(
            "latitude present without longitude".to_string(),
        )),
        (None, Some(_)) => Err(ImportError::InvalidLocation(
            "longitude present without latitude".to_string(),
        )),
        (Some(lat), Some(lon)) => {
            if !(-90.0..=90.0).contains(&lat) {
                return Err(ImportError::InvalidLocation(format!(
                    "latitude {} outside [-90, 90]",
                    lat
                )));
            }
            if !(-180.0..=180.0).contains(&lon) {
                return Err(ImportError::InvalidLocation(format!(
                    "longitude {} outside [-180, 180]",
                    lon
                )));
            }
            Ok(())
        }
    }
}
