//! Analysis history domain models
//!
//! One entry per analysed capture. The list is owned by the history domain
//! for the lifetime of a session and is deliberately excluded from local
//! persistence; it is re-fetched from the history service per authenticated
//! identifier, or replaced wholesale by a restored backup.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Media type of an analysed capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Image,
    Video,
}

/// References to the captured media and its derived thumbnail.
///
/// URLs are presigned by the backend and expire; [`AnalysisEntry::job_id`]
/// lets the hosting shell re-fetch fresh ones from the jobs API.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MediaRefs {
    pub media_url: Option<String>,
    pub thumbnail_url: Option<String>,
}

/// Derived nutritional totals for one analysis.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NutritionSummary {
    pub calories_kcal: f64,
    pub protein_g: f64,
    pub carbs_g: f64,
    pub fat_g: f64,
}

/// One analysed capture in the user's history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisEntry {
    pub id: String,
    pub kind: MediaKind,
    pub captured_at: DateTime<Utc>,
    #[serde(default)]
    pub media: MediaRefs,
    #[serde(default)]
    pub nutrition: NutritionSummary,
    /// Backend job id, kept so expiring derived-asset URLs can be re-fetched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_id: Option<String>,
}

/// Newest-first history list.
///
/// New entries are prepended. On restore the list is replaced wholesale,
/// never merged element-wise with a backup.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HistoryList {
    entries: Vec<AnalysisEntry>,
}

impl HistoryList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: Vec<AnalysisEntry>) -> Self {
        Self { entries }
    }

    /// Insert a new entry at the head of the list.
    pub fn prepend(&mut self, entry: AnalysisEntry) {
        self.entries.insert(0, entry);
    }

    /// Remove the entry with the given id. Returns whether one was removed.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.id != id);
        self.entries.len() != before
    }

    /// Replace the whole list, e.g. with a restored backup or a fresh
    /// fetch from the history service.
    pub fn replace_all(&mut self, entries: Vec<AnalysisEntry>) {
        self.entries = entries;
    }

    pub fn entries(&self) -> &[AnalysisEntry] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<AnalysisEntry> {
        self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
