// Lumen Journal - Canonical Entry Model
// The validated journal entry produced by the import pipeline, plus the
// closed mood/activity/visualization enumerations.
//
// Every entry carries one member of each enumeration; unclassifiable legacy
// values land on the explicit defaults (Neutral / Unknown) rather than an
// "unrecognized" member.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Mood scale recovered from free-form legacy values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mood {
    VeryHappy,
    Happy,
    Neutral,
    Sad,
    VerySad,
}

impl Mood {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mood::VeryHappy => "very_happy",
            Mood::Happy => "happy",
            Mood::Neutral => "neutral",
            Mood::Sad => "sad",
            Mood::VerySad => "very_sad",
        }
    }

    pub fn parse(s: &str) -> Option<Mood> {
        match s {
            "very_happy" => Some(Mood::VeryHappy),
            "happy" => Some(Mood::Happy),
            "neutral" => Some(Mood::Neutral),
            "sad" => Some(Mood::Sad),
            "very_sad" => Some(Mood::VerySad),
            _ => None,
        }
    }
}

impl Default for Mood {
    fn default() -> Self {
        Mood::Neutral
    }
}

/// Activity classification recovered from free-form legacy values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Activity {
    Work,
    Exercise,
    Social,
    Food,
    Travel,
    Learning,
    Entertainment,
    Health,
    Family,
    Unknown,
}

impl Activity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Activity::Work => "work",
            Activity::Exercise => "exercise",
            Activity::Social => "social",
            Activity::Food => "food",
            Activity::Travel => "travel",
            Activity::Learning => "learning",
            Activity::Entertainment => "entertainment",
            Activity::Health => "health",
            Activity::Family => "family",
            Activity::Unknown => "unknown",
        }
    }

    pub fn parse(s: &str) -> Option<Activity> {
        match s {
            "work" => Some(Activity::Work),
            "exercise" => Some(Activity::Exercise),
            "social" => Some(Activity::Social),
            "food" => Some(Activity::Food),
            "travel" => Some(Activity::Travel),
            "learning" => Some(Activity::Learning),
            "entertainment" => Some(Activity::Entertainment),
            "health" => Some(Activity::Health),
            "family" => Some(Activity::Family),
            "unknown" => Some(Activity::Unknown),
            _ => None,
        }
    }
}

impl Default for Activity {
    fn default() -> Self {
        Activity::Unknown
    }
}

/// Rendering hint for the downstream presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VisualizationCategory {
    Cluster,
    Path,
    Constellation,
    Orb,
    Particle,
}

impl VisualizationCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            VisualizationCategory::Cluster => "cluster",
            VisualizationCategory::Path => "path",
            VisualizationCategory::Constellation => "constellation",
            VisualizationCategory::Orb => "orb",
            VisualizationCategory::Particle => "particle",
        }
    }

    pub fn parse(s: &str) -> Option<VisualizationCategory> {
        match s {
            "cluster" => Some(VisualizationCategory::Cluster),
            "path" => Some(VisualizationCategory::Path),
            "constellation" => Some(VisualizationCategory::Constellation),
            "orb" => Some(VisualizationCategory::Orb),
            "particle" => Some(VisualizationCategory::Particle),
            _ => None,
        }
    }
}

impl Default for VisualizationCategory {
    fn default() -> Self {
        VisualizationCategory::Particle
    }
}

/// 3-component placement hint derived from mood and activity.
/// x is reserved for a downstream sequencing assignment and is always 0
/// at build time.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SpatialPlacement {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl SpatialPlacement {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// Canonical journal entry record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalEntry {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub content: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub tags: Vec<String>,
    pub mood: Mood,
    pub activity: Activity,
    pub visualization_category: VisualizationCategory,
    pub spatial_placement: SpatialPlacement,
}

impl JournalEntry {
    /// Whether the entry carries a complete coordinate pair
    pub fn has_location(&self) -> bool {
        self.latitude.is_some() && self.longitude.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mood_round_trip() {
        for mood in [
            Mood::VeryHappy,
            Mood::Happy,
            Mood::Neutral,
            Mood::Sad,
            Mood::VerySad,
        ] {
            assert_eq!(Mood::parse(mood.as_str()), Some(mood));
        }
        assert_eq!(Mood::parse("ecstatic"), None);
    }

    #[test]
    fn test_activity_round_trip() {
        for activity in [
            Activity::Work,
            Activity::Exercise,
            Activity::Social,
            Activity::Food,
            Activity::Travel,
            Activity::Learning,
            Activity::Entertainment,
            Activity::Health,
            Activity::Family,
            Activity::Unknown,
        ] {
            assert_eq!(Activity::parse(activity.as_str()), Some(activity));
        }
    }

    #[test]
    fn test_category_round_trip() {
        for category in [
            VisualizationCategory::Cluster,
            VisualizationCategory::Path,
            VisualizationCategory::Constellation,
            VisualizationCategory::Orb,
            VisualizationCategory::Particle,
        ] {
            assert_eq!(VisualizationCategory::parse(category.as_str()), Some(category));
        }
    }

    #[test]
    fn test_defaults_are_the_explicit_fallback_members() {
        assert_eq!(Mood::default(), Mood::Neutral);
        assert_eq!(Activity::default(), Activity::Unknown);
    }
}
