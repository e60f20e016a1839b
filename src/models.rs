use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::{KeyError, SinkError};

// Minute resolution, UTC. Part of the persisted key format.
pub const BUCKET_FORMAT: &str = "%Y-%m-%d %H:%M";

// Separator between category and bucket in a persisted key
const KEY_SEPARATOR: &str = " : ";

// Content labels a view can be attributed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Sports,
    Entertainment,
    Business,
    Education,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Sports,
        Category::Entertainment,
        Category::Business,
        Category::Education,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Sports => "sports",
            Category::Entertainment => "entertainment",
            Category::Business => "business",
            Category::Education => "education",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| KeyError::UnknownCategory(s.to_string()))
    }
}

/// Wall-clock minute a tally belongs to, e.g. `2024-03-01 12:34`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimeBucket(String);

impl TimeBucket {
    pub fn now() -> Self {
        Self::from_datetime(Utc::now())
    }

    pub fn from_datetime(at: DateTime<Utc>) -> Self {
        Self(at.format(BUCKET_FORMAT).to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TimeBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for TimeBucket {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Round-trip through chrono so only canonical minute labels get in
        let parsed = NaiveDateTime::parse_from_str(s, BUCKET_FORMAT)
            .map_err(|_| KeyError::InvalidBucket(s.to_string()))?;
        Ok(Self::from_datetime(parsed.and_utc()))
    }
}

/// Identifies one tally: `(category, minute)`.
///
/// Serialized as `"<category> : <YYYY-MM-DD HH:MM>"`, which is the key format
/// persisted snapshots and the stats endpoint expose.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CounterKey {
    pub category: Category,
    pub bucket: TimeBucket,
}

impl CounterKey {
    pub fn new(category: Category, bucket: TimeBucket) -> Self {
        Self { category, bucket }
    }
}

impl fmt::Display for CounterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.category, KEY_SEPARATOR, self.bucket)
    }
}

impl FromStr for CounterKey {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (category, bucket) = s
            .split_once(KEY_SEPARATOR)
            .ok_or_else(|| KeyError::MissingSeparator(s.to_string()))?;
        Ok(Self::new(category.parse()?, bucket.parse()?))
    }
}

impl Serialize for CounterKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CounterKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

// View/click pair for one key. Field names are part of the persisted format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tally {
    pub view: u64,
    pub click: u64,
}

/// Point-in-time copy of every tally, as written to the sink.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot {
    tallies: BTreeMap<CounterKey, Tally>,
}

impl Snapshot {
    pub fn get(&self, key: &CounterKey) -> Option<&Tally> {
        self.tallies.get(key)
    }

    pub fn len(&self) -> usize {
        self.tallies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tallies.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&CounterKey, &Tally)> {
        self.tallies.iter()
    }

    pub fn to_json_bytes(&self) -> Result<Vec<u8>, SinkError> {
        serde_json::to_vec(self).map_err(SinkError::Serialize)
    }

    pub fn from_json_slice(bytes: &[u8]) -> Result<Self, SinkError> {
        serde_json::from_slice(bytes).map_err(SinkError::Parse)
    }
}

impl FromIterator<(CounterKey, Tally)> for Snapshot {
    fn from_iter<I: IntoIterator<Item = (CounterKey, Tally)>>(iter: I) -> Self {
        Self {
            tallies: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn bucket(s: &str) -> TimeBucket {
        s.parse().unwrap()
    }

    #[test]
    fn bucket_truncates_to_minute() {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 9, 5, 59).unwrap();
        assert_eq!(TimeBucket::from_datetime(at).as_str(), "2024-03-01 09:05");
    }

    #[test]
    fn key_uses_persisted_format() {
        let key = CounterKey::new(Category::Sports, bucket("2024-03-01 09:05"));
        assert_eq!(key.to_string(), "sports : 2024-03-01 09:05");
        assert_eq!("sports : 2024-03-01 09:05".parse::<CounterKey>().unwrap(), key);
    }

    #[test]
    fn rejects_malformed_keys() {
        assert!(matches!(
            "movies : 2024-03-01 09:05".parse::<CounterKey>(),
            Err(KeyError::UnknownCategory(_))
        ));
        assert!(matches!(
            "sports-2024-03-01 09:05".parse::<CounterKey>(),
            Err(KeyError::MissingSeparator(_))
        ));
        assert!(matches!(
            "sports : yesterday".parse::<CounterKey>(),
            Err(KeyError::InvalidBucket(_))
        ));
    }

    #[test]
    fn snapshot_json_shape() {
        let snapshot: Snapshot = [(
            CounterKey::new(Category::Business, bucket("2024-03-01 09:05")),
            Tally { view: 3, click: 1 },
        )]
        .into_iter()
        .collect();

        let json: serde_json::Value =
            serde_json::from_slice(&snapshot.to_json_bytes().unwrap()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "business : 2024-03-01 09:05": { "view": 3, "click": 1 } })
        );
    }

    #[test]
    fn snapshot_round_trips() {
        let snapshot: Snapshot = [
            (
                CounterKey::new(Category::Sports, bucket("2024-03-01 09:05")),
                Tally { view: 10, click: 4 },
            ),
            (
                CounterKey::new(Category::Education, bucket("2024-03-01 09:06")),
                Tally { view: 0, click: 2 },
            ),
        ]
        .into_iter()
        .collect();

        let bytes = snapshot.to_json_bytes().unwrap();
        assert_eq!(Snapshot::from_json_slice(&bytes).unwrap(), snapshot);
    }

    #[test]
    fn parse_failure_is_reported() {
        assert!(matches!(
            Snapshot::from_json_slice(b"{\"sports\": 1"),
            Err(SinkError::Parse(_))
        ));
    }
}
