use crate::dates;
use chrono::{DateTime, Local, NaiveDate};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GratitudeEntry {
    pub id: u64,
    pub content: String,
    /// Calendar day in `yyyy-MM-dd` form.
    pub date: String,
    #[serde(default = "Local::now")]
    pub created_at: DateTime<Local>,
}

impl GratitudeEntry {
    pub fn new(id: u64, content: String, date: String) -> Self {
        GratitudeEntry {
            id,
            content,
            date,
            created_at: Local::now(),
        }
    }

    pub fn parsed_date(&self) -> Option<NaiveDate> {
        dates::parse_entry_date(&self.date)
    }

    /// First line of the content, used for list rows.
    pub fn headline(&self) -> &str {
        self.content.lines().next().unwrap_or("")
    }
}
