use chrono::DateTime;
use chrono::Local;
use uuid::Uuid;

use super::ImageRef;

/// One completed generation. Never mutated after creation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HistoryEntry {
    pub id: String,
    pub url: ImageRef,
    pub prompt: String,
    pub timestamp: DateTime<Local>,
}

impl HistoryEntry {
    pub fn new(url: ImageRef, prompt: &str) -> HistoryEntry {
        return HistoryEntry {
            id: Uuid::new_v4().to_string(),
            url,
            prompt: prompt.to_string(),
            timestamp: Local::now(),
        };
    }
}
