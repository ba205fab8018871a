use std::{fmt, str::FromStr};

use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::Value;

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_newtype!(RecordId);
id_newtype!(CatalogId);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::High, Priority::Medium, Priority::Low];

    pub fn as_str(self) -> &'static str {
        match self {
            Priority::High => "High",
            Priority::Medium => "Medium",
            Priority::Low => "Low",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Priority::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| format!("unknown priority '{trimmed}' (expected High, Medium or Low)"))
    }
}

/// Which of the two persisted lists a record belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ListKind {
    Inventory,
    Wishlist,
}

impl ListKind {
    /// Sheet name understood by the remote store.
    pub fn sheet_name(self) -> &'static str {
        match self {
            ListKind::Inventory => "Inventory",
            ListKind::Wishlist => "Wishlist",
        }
    }

    pub fn export_filename(self) -> &'static str {
        match self {
            ListKind::Inventory => "vinyl-inventory.csv",
            ListKind::Wishlist => "vinyl-wishlist.csv",
        }
    }
}

impl fmt::Display for ListKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.sheet_name())
    }
}

impl FromStr for ListKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "inventory" | "collection" => Ok(ListKind::Inventory),
            "wishlist" => Ok(ListKind::Wishlist),
            other => Err(format!("unknown list '{other}' (expected inventory or wishlist)")),
        }
    }
}

/// Release year as reported upstream: a number, or placeholder text such as `N/A`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ReleaseYear {
    Year(i64),
    Text(String),
}

impl ReleaseYear {
    pub const UNKNOWN: &'static str = "N/A";

    pub fn unknown() -> Self {
        ReleaseYear::Text(Self::UNKNOWN.to_string())
    }
}

impl Default for ReleaseYear {
    fn default() -> Self {
        Self::unknown()
    }
}

impl fmt::Display for ReleaseYear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReleaseYear::Year(year) => write!(f, "{year}"),
            ReleaseYear::Text(text) => f.write_str(text),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    #[serde(deserialize_with = "lenient_record_id")]
    pub id: RecordId,
    pub title: String,
    pub artist: String,
    #[serde(default)]
    pub year: ReleaseYear,
    #[serde(default)]
    pub cover_image: String,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "blank_priority_as_none"
    )]
    pub priority: Option<Priority>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_catalog_id"
    )]
    pub discogs_id: Option<CatalogId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    #[serde(default)]
    pub position: String,
    pub title: String,
    #[serde(default)]
    pub duration: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Format {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qty: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub descriptions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSuggestion {
    pub currency: String,
    pub value: f64,
}

/// A record together with the release information fetched on demand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordDetail {
    #[serde(flatten)]
    pub record: Record,
    pub tracklist: Vec<Track>,
    pub formats: Vec<Format>,
    pub country: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_suggestion: Option<PriceSuggestion>,
}

// Spreadsheet rows hand back empty cells as "" rather than omitting them.
fn blank_priority_as_none<'de, D>(deserializer: D) -> Result<Option<Priority>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value.parse().map(Some).map_err(de::Error::custom),
    }
}

// Sheet cells may hold ids as numbers or as text; blank means absent.
fn parse_lenient_id(raw: Option<Value>) -> Result<Option<i64>, String> {
    match raw {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n
            .as_i64()
            .map(Some)
            .ok_or_else(|| format!("invalid id {n}")),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => s
            .trim()
            .parse::<i64>()
            .map(Some)
            .map_err(|e| format!("invalid id '{s}': {e}")),
        Some(other) => Err(format!("invalid id {other}")),
    }
}

fn lenient_record_id<'de, D>(deserializer: D) -> Result<RecordId, D::Error>
where
    D: Deserializer<'de>,
{
    match parse_lenient_id(Option::<Value>::deserialize(deserializer)?) {
        Ok(Some(id)) => Ok(RecordId(id)),
        Ok(None) => Err(de::Error::custom("record id is blank")),
        Err(err) => Err(de::Error::custom(err)),
    }
}

fn lenient_catalog_id<'de, D>(deserializer: D) -> Result<Option<CatalogId>, D::Error>
where
    D: Deserializer<'de>,
{
    parse_lenient_id(Option::<Value>::deserialize(deserializer)?)
        .map(|id| id.map(CatalogId))
        .map_err(de::Error::custom)
}
