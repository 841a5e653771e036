// Lumen Journal - Field Normalizer
// Pure mapping from free-form legacy mood/activity strings into the closed
// enumerations, plus visualization classification and spatial placement.
//
// Mood resolution order: exact curated match, numeric band fallback,
// substring keyword fallback, neutral. The numeric bands mix 1-10 and 1-5
// legacy scales and overlap on purpose; the first matching band wins and the
// order below is load-bearing.

use once_cell::sync::Lazy;
use std::collections::HashMap;

use crate::journal_entry::{Activity, Mood, SpatialPlacement, VisualizationCategory};
use crate::row_extractor::LegacyEntry;

/// Content length above which an entry renders as an orb
const ORB_CONTENT_THRESHOLD: usize = 200;

static MOOD_EXACT: Lazy<HashMap<&'static str, Mood>> = Lazy::new(|| {
    let mut map = HashMap::new();
    for word in ["very happy", "excited", "ecstatic", "joyful", "elated", "5"] {
        map.insert(word, Mood::VeryHappy);
    }
    for word in ["happy", "good", "positive", "cheerful", "content", "4"] {
        map.insert(word, Mood::Happy);
    }
    for word in ["neutral", "okay", "fine", "normal", "average", "3"] {
        map.insert(word, Mood::Neutral);
    }
    for word in ["sad", "down", "low", "unhappy", "melancholy", "2"] {
        map.insert(word, Mood::Sad);
    }
    for word in ["very sad", "depressed", "terrible", "awful", "devastated", "1"] {
        map.insert(word, Mood::VerySad);
    }
    map
});

// First matching band wins; the 1-10 and 1-5 scale values are interleaved
// exactly as the legacy data used them.
const MOOD_BANDS: &[(&[i64], Mood)] = &[
    (&[9, 10, 5], Mood::VeryHappy),
    (&[7, 8, 4], Mood::Happy),
    (&[5, 6, 3], Mood::Neutral),
    (&[3, 4, 2], Mood::Sad),
    (&[1, 2, 1], Mood::VerySad),
];

static ACTIVITY_EXACT: Lazy<HashMap<&'static str, Activity>> = Lazy::new(|| {
    let mut map = HashMap::new();
    for word in ["work", "working", "job", "office", "meeting"] {
        map.insert(word, Activity::Work);
    }
    for word in ["exercise", "workout", "gym", "run", "running", "yoga", "sports"] {
        map.insert(word, Activity::Exercise);
    }
    for word in ["social", "friends", "party", "hangout", "date"] {
        map.insert(word, Activity::Social);
    }
    for word in ["food", "meal", "dinner", "lunch", "breakfast", "cooking"] {
        map.insert(word, Activity::Food);
    }
    for word in ["travel", "trip", "vacation", "flight", "commute"] {
        map.insert(word, Activity::Travel);
    }
    for word in ["learning", "study", "studying", "reading", "class", "course"] {
        map.insert(word, Activity::Learning);
    }
    for word in ["entertainment", "movie", "music", "gaming", "tv", "show"] {
        map.insert(word, Activity::Entertainment);
    }
    for word in ["health", "doctor", "meditation", "therapy", "sleep"] {
        map.insert(word, Activity::Health);
    }
    for word in ["family", "kids", "parents", "relatives"] {
        map.insert(word, Activity::Family);
    }
    map
});

// Reduced keyword set for the substring fallback
const ACTIVITY_KEYWORDS: &[(&str, Activity)] = &[
    ("work", Activity::Work),
    ("office", Activity::Work),
    ("exercise", Activity::Exercise),
    ("gym", Activity::Exercise),
    ("friend", Activity::Social),
    ("social", Activity::Social),
    ("food", Activity::Food),
    ("eat", Activity::Food),
    ("travel", Activity::Travel),
    ("trip", Activity::Travel),
    ("learn", Activity::Learning),
    ("study", Activity::Learning),
    ("family", Activity::Family),
    ("home", Activity::Family),
];

/// Map a raw legacy mood value onto the closed mood scale.
/// Total: any input, including blank or unrecognized text, yields a member.
pub fn normalize_mood(raw: Option<&str>) -> Mood {
    let raw = match raw {
        Some(s) => s.trim().to_lowercase(),
        None => return Mood::Neutral,
    };
    if raw.is_empty() {
        return Mood::Neutral;
    }

    if let Some(mood) = MOOD_EXACT.get(raw.as_str()) {
        return *mood;
    }

    if let Ok(value) = raw.parse::<i64>() {
        for (band, mood) in MOOD_BANDS {
            if band.contains(&value) {
                return *mood;
            }
        }
        return Mood::Neutral;
    }

    if ["happy", "great", "excellent"].iter().any(|k| raw.contains(k)) {
        return Mood::Happy;
    }
    if ["sad", "bad", "awful"].iter().any(|k| raw.contains(k)) {
        return Mood::Sad;
    }

    Mood::Neutral
}

/// Map a raw legacy activity value onto the closed activity set.
pub fn normalize_activity(raw: Option<&str>) -> Activity {
    let raw = match raw {
        Some(s) => s.trim().to_lowercase(),
        None => return Activity::Unknown,
    };
    if raw.is_empty() {
        return Activity::Unknown;
    }

    if let Some(activity) = ACTIVITY_EXACT.get(raw.as_str()) {
        return *activity;
    }

    for (keyword, activity) in ACTIVITY_KEYWORDS {
        if raw.contains(keyword) {
            return *activity;
        }
    }

    Activity::Unknown
}

/// Pick the visualization category for an extracted record.
/// Rules are evaluated in order; the first match wins. Movement-type
/// activities render as paths even when the entry carries coordinates.
pub fn classify(record: &LegacyEntry, _mood: Mood, activity: Activity) -> VisualizationCategory {
    if matches!(activity, Activity::Travel | Activity::Exercise) {
        return VisualizationCategory::Path;
    }
    if record.latitude.is_some() && record.longitude.is_some() {
        return VisualizationCategory::Cluster;
    }
    if matches!(activity, Activity::Social | Activity::Family) {
        return VisualizationCategory::Constellation;
    }
    let raw_mood_has_very = record
        .mood
        .as_deref()
        .map(|m| m.to_lowercase().contains("very"))
        .unwrap_or(false);
    if record.content.chars().count() > ORB_CONTENT_THRESHOLD || raw_mood_has_very {
        return VisualizationCategory::Orb;
    }
    VisualizationCategory::Particle
}

/// Per-mood intensity constant in [0, 1]
pub fn mood_intensity(mood: Mood) -> f64 {
    match mood {
        Mood::VeryHappy => 1.0,
        Mood::Happy => 0.8,
        Mood::Neutral => 0.5,
        Mood::Sad => 0.3,
        Mood::VerySad => 0.1,
    }
}

/// Per-activity depth lane constant
pub fn activity_lane(activity: Activity) -> f64 {
    match activity {
        Activity::Work => -1.5,
        Activity::Exercise => -1.0,
        Activity::Social => -0.5,
        Activity::Food => 0.0,
        Activity::Travel => 0.5,
        Activity::Learning => 1.0,
        Activity::Entertainment => 1.5,
        Activity::Health => -2.0,
        Activity::Family => 2.0,
        Activity::Unknown => 0.0,
    }
}

/// Derive the placement hint from mood and activity.
/// x stays 0; a downstream sequencing pass assigns it.
pub fn place(mood: Mood, activity: Activity) -> SpatialPlacement {
    SpatialPlacement::new(0.0, mood_intensity(mood) * 2.0 - 1.0, activity_lane(activity))
}
