use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::constants::{PODCASTS_COLLECTION, TRACKS_COLLECTION};

use super::DurationProbeResult;

/// Catalog entry variant, one collection each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CatalogKind {
    Track,
    Episode,
}

impl CatalogKind {
    /// Reconciliation order: tracks first, then episodes.
    pub const ALL: [CatalogKind; 2] = [CatalogKind::Track, CatalogKind::Episode];

    pub fn collection(&self) -> &'static str {
        match self {
            CatalogKind::Track => TRACKS_COLLECTION,
            CatalogKind::Episode => PODCASTS_COLLECTION,
        }
    }
}

impl FromStr for CatalogKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "track" => Ok(CatalogKind::Track),
            "podcast" | "episode" => Ok(CatalogKind::Episode),
            _ => Err(anyhow::anyhow!(
                "Invalid type '{}': expected 'track' or 'podcast'",
                s
            )),
        }
    }
}

impl Display for CatalogKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            CatalogKind::Track => write!(f, "track"),
            CatalogKind::Episode => write!(f, "episode"),
        }
    }
}

/// Variant-specific fields of a catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum CatalogDetails {
    Track {
        artist: String,
        album: String,
    },
    Episode {
        host: String,
        description: String,
        episode_number: u32,
    },
}

impl CatalogDetails {
    pub fn kind(&self) -> CatalogKind {
        match self {
            CatalogDetails::Track { .. } => CatalogKind::Track,
            CatalogDetails::Episode { .. } => CatalogKind::Episode,
        }
    }

    fn write_fields(&self, fields: &mut Map<String, Value>) {
        match self {
            CatalogDetails::Track { artist, album } => {
                fields.insert("artist".into(), json!(artist));
                fields.insert("album".into(), json!(album));
            }
            CatalogDetails::Episode {
                host,
                description,
                episode_number,
            } => {
                fields.insert("host".into(), json!(host));
                fields.insert("description".into(), json!(description));
                fields.insert("episodeNumber".into(), json!(episode_number));
            }
        }
    }

    fn read_fields(kind: CatalogKind, fields: &Map<String, Value>) -> Self {
        match kind {
            CatalogKind::Track => CatalogDetails::Track {
                artist: str_field(fields, "artist"),
                album: str_field(fields, "album"),
            },
            CatalogKind::Episode => CatalogDetails::Episode {
                host: str_field(fields, "host"),
                description: str_field(fields, "description"),
                episode_number: fields
                    .get("episodeNumber")
                    .and_then(Value::as_u64)
                    .and_then(|n| u32::try_from(n).ok())
                    .unwrap_or(1),
            },
        }
    }
}

/// A catalog entry about to be inserted. The store assigns `id` and `createdAt`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCatalogEntry {
    pub title: String,
    pub category_id: String,
    pub audio_url: String,
    pub cover_url: String,
    pub duration_seconds: u64,
    pub has_accurate_duration: bool,
    pub details: CatalogDetails,
}

impl NewCatalogEntry {
    pub fn kind(&self) -> CatalogKind {
        self.details.kind()
    }

    /// Document fields as stored; `plays` always starts at 0.
    pub fn to_fields(&self) -> Map<String, Value> {
        let mut fields = Map::new();
        fields.insert("title".into(), json!(self.title));
        fields.insert("audioUrl".into(), json!(self.audio_url));
        fields.insert("coverUrl".into(), json!(self.cover_url));
        fields.insert("duration".into(), json!(self.duration_seconds));
        fields.insert("categoryId".into(), json!(self.category_id));
        fields.insert("plays".into(), json!(0));
        fields.insert(
            "hasAccurateDuration".into(),
            json!(self.has_accurate_duration),
        );
        self.details.write_fields(&mut fields);
        fields
    }
}

/// A persisted Track or Episode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    pub id: String,
    pub title: String,
    pub category_id: String,
    pub audio_url: String,
    pub cover_url: String,
    /// Stored as `duration`. `None` when absent or not a non-negative number.
    pub duration_seconds: Option<u64>,
    /// Stored as `plays`.
    pub play_count: u64,
    pub has_accurate_duration: Option<bool>,
    pub created_at: DateTime<Utc>,
    pub details: CatalogDetails,
}

impl CatalogEntry {
    /// Decodes stored fields leniently; legacy documents may miss any of them.
    pub fn from_fields(
        kind: CatalogKind,
        id: impl Into<String>,
        created_at: DateTime<Utc>,
        fields: &Map<String, Value>,
    ) -> Self {
        Self {
            id: id.into(),
            title: str_field(fields, "title"),
            category_id: str_field(fields, "categoryId"),
            audio_url: str_field(fields, "audioUrl"),
            cover_url: str_field(fields, "coverUrl"),
            duration_seconds: fields.get("duration").and_then(non_negative_secs),
            play_count: fields.get("plays").and_then(Value::as_u64).unwrap_or(0),
            has_accurate_duration: fields.get("hasAccurateDuration").and_then(Value::as_bool),
            created_at,
            details: CatalogDetails::read_fields(kind, fields),
        }
    }

    pub fn kind(&self) -> CatalogKind {
        self.details.kind()
    }
}

/// Partial update written after a successful duration probe.
///
/// `durationSeconds` holds the seconds component, not the total.
pub fn duration_patch(result: &DurationProbeResult, checked_at: DateTime<Utc>) -> Map<String, Value> {
    let mut patch = Map::new();
    patch.insert("duration".into(), json!(result.total_seconds));
    patch.insert("durationFormatted".into(), json!(result.formatted()));
    patch.insert("durationMinutes".into(), json!(result.minutes));
    patch.insert("durationSeconds".into(), json!(result.seconds));
    patch.insert("hasAccurateDuration".into(), json!(true));
    patch.insert(
        "lastDurationCheck".into(),
        json!(checked_at.to_rfc3339_opts(SecondsFormat::Millis, true)),
    );
    patch
}

fn str_field(fields: &Map<String, Value>, key: &str) -> String {
    fields
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn non_negative_secs(value: &Value) -> Option<u64> {
    value.as_u64().or_else(|| {
        value
            .as_f64()
            .filter(|v| v.is_finite() && *v >= 0.0)
            .map(|v| v.floor() as u64)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn new_track() -> NewCatalogEntry {
        NewCatalogEntry {
            title: "Summer Vibes".to_string(),
            category_id: "rock".to_string(),
            audio_url: "https://cdn.example.com/a.mp3".to_string(),
            cover_url: "https://via.placeholder.com/300".to_string(),
            duration_seconds: 185,
            has_accurate_duration: true,
            details: CatalogDetails::Track {
                artist: "The Band".to_string(),
                album: String::new(),
            },
        }
    }

    #[test]
    fn kind_parses_type_discriminator() {
        assert_eq!("track".parse::<CatalogKind>().unwrap(), CatalogKind::Track);
        assert_eq!("podcast".parse::<CatalogKind>().unwrap(), CatalogKind::Episode);
        assert_eq!("Episode".parse::<CatalogKind>().unwrap(), CatalogKind::Episode);
        assert!("video".parse::<CatalogKind>().is_err());
        assert_eq!(CatalogKind::Episode.collection(), "podcasts");
    }

    #[test]
    fn new_entry_fields_use_document_layout() {
        let fields = new_track().to_fields();
        assert_eq!(fields["duration"], json!(185));
        assert_eq!(fields["plays"], json!(0));
        assert_eq!(fields["audioUrl"], json!("https://cdn.example.com/a.mp3"));
        assert_eq!(fields["album"], json!(""));
        assert!(!fields.contains_key("host"));
    }

    #[test]
    fn entry_round_trips_through_fields() {
        let created_at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let entry = CatalogEntry::from_fields(CatalogKind::Track, "abc", created_at, &new_track().to_fields());
        assert_eq!(entry.duration_seconds, Some(185));
        assert_eq!(entry.play_count, 0);
        assert_eq!(entry.has_accurate_duration, Some(true));
        assert_eq!(entry.kind(), CatalogKind::Track);
    }

    #[test]
    fn legacy_fields_decode_leniently() {
        let mut fields = Map::new();
        fields.insert("duration".into(), json!(212.7));
        fields.insert("audioUrl".into(), json!("https://x/y.mp3"));
        let entry = CatalogEntry::from_fields(CatalogKind::Episode, "e1", Utc::now(), &fields);
        assert_eq!(entry.duration_seconds, Some(212));
        assert_eq!(
            entry.details,
            CatalogDetails::Episode {
                host: String::new(),
                description: String::new(),
                episode_number: 1
            }
        );

        fields.insert("duration".into(), json!("3:00"));
        let entry = CatalogEntry::from_fields(CatalogKind::Episode, "e1", Utc::now(), &fields);
        assert_eq!(entry.duration_seconds, None);
    }

    #[test]
    fn duration_patch_contains_decomposition() {
        let checked_at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let patch = duration_patch(&DurationProbeResult::from_total_seconds(185), checked_at);
        assert_eq!(patch["duration"], json!(185));
        assert_eq!(patch["durationFormatted"], json!("3:05"));
        assert_eq!(patch["durationMinutes"], json!(3));
        assert_eq!(patch["durationSeconds"], json!(5));
        assert_eq!(patch["hasAccurateDuration"], json!(true));
        assert_eq!(patch["lastDurationCheck"], json!("2024-05-01T12:00:00.000Z"));
    }
}
