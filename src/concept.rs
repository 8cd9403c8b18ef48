//! Concept data model and the sources that supply it.
//!
//! A `Concept` is one learned topic; the visualization treats the list as an
//! immutable snapshot and recomputes its layouts whenever the snapshot
//! changes.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::LoadError;

/// Sample concepts bundled with the binary, used when no data file exists.
const SAMPLE_CONCEPTS: &str = include_str!("../data/concepts.json");

// ── LearnedDate ──

/// Calendar day a concept was learned, ordered chronologically.
pub type LearnedDate = NaiveDate;

/// Parse `YYYY-MM-DD`, or an RFC 3339 / ISO 8601 timestamp whose date part
/// is kept. Anything else after the date is rejected.
pub fn parse_learned_date(text: &str) -> Result<LearnedDate, LoadError> {
    let text = text.trim();
    let bad = |e: chrono::ParseError| {
        LoadError::new("date", format!("invalid date {:?}: {}", text, e))
    };
    if !text.contains('T') {
        return NaiveDate::parse_from_str(text, "%Y-%m-%d").map_err(bad);
    }
    match DateTime::parse_from_rfc3339(text) {
        Ok(stamp) => Ok(stamp.date_naive()),
        Err(_) => NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
            .map(|stamp| stamp.date())
            .map_err(bad),
    }
}

fn deserialize_learned_date<'de, D>(deserializer: D) -> Result<LearnedDate, D::Error>
where
    D: Deserializer<'de>,
{
    let text = String::deserialize(deserializer)?;
    parse_learned_date(&text).map_err(serde::de::Error::custom)
}

// ── Concept ──

/// One knowledge-base entry; becomes one point in the 3D view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Concept {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub short_summary: String,
    #[serde(default)]
    pub long_summary: String,
    #[serde(deserialize_with = "deserialize_learned_date")]
    pub date_learned: LearnedDate,
    /// Position hints used when no embedding projection is available
    #[serde(default)]
    pub x: f32,
    #[serde(default)]
    pub y: f32,
    #[serde(default)]
    pub z: f32,
    #[serde(default)]
    pub embedding: Option<Vec<f32>>,
}

impl Concept {
    pub fn position_hint(&self) -> [f32; 3] {
        [self.x, self.y, self.z]
    }
}

// ── Sources ──

/// Supplier of the concept snapshot. Implemented by the surrounding
/// application's data layer.
pub trait ConceptSource {
    fn list(&self) -> Result<Vec<Concept>, LoadError>;
}

/// Concepts read from a JSON array on disk.
pub struct JsonConceptSource {
    path: PathBuf,
}

impl JsonConceptSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl ConceptSource for JsonConceptSource {
    fn list(&self) -> Result<Vec<Concept>, LoadError> {
        let text = fs::read_to_string(&self.path).map_err(|e| {
            LoadError::new("read", format!("{}: {}", self.path.display(), e))
        })?;
        let concepts = parse_concepts(&text)?;
        log::info!("loaded {} concepts from {}", concepts.len(), self.path.display());
        Ok(concepts)
    }
}

/// In-memory concepts (tests, bundled sample data).
pub struct StaticConceptSource {
    concepts: Vec<Concept>,
}

impl StaticConceptSource {
    pub fn new(concepts: Vec<Concept>) -> Self {
        Self { concepts }
    }

    /// The sample data compiled into the binary.
    pub fn sample() -> Result<Self, LoadError> {
        Ok(Self::new(parse_concepts(SAMPLE_CONCEPTS)?))
    }
}

impl ConceptSource for StaticConceptSource {
    fn list(&self) -> Result<Vec<Concept>, LoadError> {
        Ok(self.concepts.clone())
    }
}

/// Parse a JSON array of concepts and reject duplicate ids.
pub fn parse_concepts(text: &str) -> Result<Vec<Concept>, LoadError> {
    let concepts: Vec<Concept> =
        serde_json::from_str(text).map_err(|e| LoadError::new("parse", e.to_string()))?;
    let mut seen = std::collections::HashSet::with_capacity(concepts.len());
    for c in &concepts {
        if !seen.insert(c.id.as_str()) {
            return Err(LoadError::new("parse", format!("duplicate concept id {:?}", c.id)));
        }
    }
    Ok(concepts)
}

#[cfg(test)]
pub(crate) fn test_concept(id: &str, date: &str) -> Concept {
    Concept {
        id: id.to_string(),
        name: id.to_uppercase(),
        short_summary: String::new(),
        long_summary: String::new(),
        date_learned: parse_learned_date(date).expect("valid test date"),
        x: 0.0,
        y: 0.0,
        z: 0.0,
        embedding: None,
    }
}
