use crate::dates;
use crate::filter::{self, GratitudeFilter, SortOrder};
use crate::gratitude_entry::GratitudeEntry;
use crate::streak::{self, JournalStats};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum JournalError {
    #[error("journal file error: {0}")]
    Io(#[from] std::io::Error),
    #[error("journal file is not valid JSON: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("entry text is empty")]
    EmptyContent,
    #[error("invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),
    #[error("no entry with id {0}")]
    NotFound(u64),
    #[error("no entry ids left")]
    IdsExhausted,
}

pub type Result<T> = std::result::Result<T, JournalError>;

#[derive(Debug, Serialize, Deserialize)]
pub struct JournalState {
    entries: Vec<GratitudeEntry>,
    next_id: u64,
    #[serde(skip)]
    path: PathBuf,
}

fn validate(content: &str, date: &str) -> Result<(String, String)> {
    let content = content.trim();
    if content.is_empty() {
        return Err(JournalError::EmptyContent);
    }
    let date = dates::parse_entry_date(date)
        .ok_or_else(|| JournalError::InvalidDate(date.trim().to_string()))?;
    Ok((content.to_string(), dates::format_entry_date(date)))
}

impl JournalState {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JournalState {
            entries: Vec::new(),
            next_id: 1,
            path: path.into(),
        }
    }

    /// Loads the journal at `path`, or starts an empty one if the file does
    /// not exist yet.
    pub fn load_or_new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if !path.exists() {
            tracing::info!("no journal at {}, starting a new one", path.display());
            return Ok(Self::new(path));
        }
        Self::load_from_file(path)
    }

    pub fn load_from_file(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let serialized = fs::read_to_string(&path)?;
        let raw: serde_json::Value = serde_json::from_str(&serialized)?;
        let missing_created_at = raw["entries"]
            .as_array()
            .is_some_and(|entries| entries.iter().any(|e| e.get("created_at").is_none()));
        let mut state: JournalState = serde_json::from_value(raw)?;

        // Guard against hand-edited files whose counter fell behind. A file
        // holding u64::MAX leaves the counter there and adding is refused.
        let max_id = state.entries.iter().map(|e| e.id).max().unwrap_or(0);
        state.next_id = state.next_id.max(max_id.saturating_add(1));
        state.path = path;

        tracing::info!(
            entries = state.entries.len(),
            "loaded journal from {}",
            state.path.display()
        );

        // Pin the creation times filled in above so same-day order is stable.
        if missing_created_at {
            if let Err(e) = state.save_to_file() {
                tracing::warn!(error = %e, "could not store filled-in creation times");
            }
        }
        Ok(state)
    }

    pub fn save_to_file(&self) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let serialized = serde_json::to_string_pretty(&self)?;
        fs::write(&self.path, serialized)?;
        tracing::debug!(entries = self.entries.len(), "saved journal");
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn add_entry(&mut self, content: &str, date: &str) -> Result<&GratitudeEntry> {
        let (content, date) = validate(content, date)?;
        let following_id = self
            .next_id
            .checked_add(1)
            .ok_or(JournalError::IdsExhausted)?;
        let entry = GratitudeEntry::new(self.next_id, content, date);
        let previous_id = std::mem::replace(&mut self.next_id, following_id);
        self.entries.push(entry);

        if let Err(e) = self.save_to_file() {
            self.entries.pop();
            self.next_id = previous_id;
            return Err(e);
        }
        let entry = &self.entries[self.entries.len() - 1];
        tracing::info!(id = entry.id, date = %entry.date, "added entry");
        Ok(entry)
    }

    /// Replaces content and date of an existing entry. The id and creation
    /// time are kept.
    pub fn update_entry(&mut self, updated_entry: GratitudeEntry) -> Result<()> {
        let (content, date) = validate(&updated_entry.content, &updated_entry.date)?;
        let index = self
            .entries
            .iter()
            .position(|e| e.id == updated_entry.id)
            .ok_or(JournalError::NotFound(updated_entry.id))?;
        let entry = &mut self.entries[index];
        let old_content = std::mem::replace(&mut entry.content, content);
        let old_date = std::mem::replace(&mut entry.date, date);

        if let Err(e) = self.save_to_file() {
            let entry = &mut self.entries[index];
            entry.content = old_content;
            entry.date = old_date;
            return Err(e);
        }
        tracing::info!(id = updated_entry.id, "updated entry");
        Ok(())
    }

    pub fn delete_entry(&mut self, id: u64) -> Result<()> {
        let index = self
            .entries
            .iter()
            .position(|e| e.id == id)
            .ok_or(JournalError::NotFound(id))?;
        let removed = self.entries.remove(index);

        if let Err(e) = self.save_to_file() {
            self.entries.insert(index, removed);
            return Err(e);
        }
        tracing::info!(id, "deleted entry");
        Ok(())
    }

    /// Removes every entry. Ids are not reused afterwards.
    pub fn clear_entries(&mut self) -> Result<usize> {
        let cleared = std::mem::take(&mut self.entries);

        if let Err(e) = self.save_to_file() {
            self.entries = cleared;
            return Err(e);
        }
        tracing::info!(removed = cleared.len(), "cleared journal");
        Ok(cleared.len())
    }

    pub fn get_entries(&self) -> &[GratitudeEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Case-insensitive substring search over entry text, newest first.
    pub fn search_entries(&self, query: &str) -> Vec<GratitudeEntry> {
        let filter = GratitudeFilter {
            keyword: Some(query.to_string()),
            ..GratitudeFilter::with_sort(SortOrder::NewestFirst)
        };
        filter.apply(&self.entries)
    }

    pub fn filtered_entries(&self, filter: &GratitudeFilter) -> Vec<GratitudeEntry> {
        filter.apply(&self.entries)
    }

    pub fn grouped_entries(
        &self,
        filter: &GratitudeFilter,
    ) -> Vec<(String, Vec<GratitudeEntry>)> {
        filter::group_by_date(&self.filtered_entries(filter))
    }

    pub fn streak(&self, today: NaiveDate) -> u32 {
        streak::calculate_streak(self.entries.iter().map(|e| e.date.as_str()), today)
    }

    pub fn stats(&self, today: NaiveDate) -> JournalStats {
        JournalStats::from_entries(&self.entries, today)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn entry(state: &JournalState, id: u64) -> &GratitudeEntry {
        state.get_entries().iter().find(|e| e.id == id).unwrap()
    }

    fn journal(dir: &TempDir) -> JournalState {
        JournalState::new(dir.path().join("journal").join("entries.json"))
    }

    #[test]
    fn add_assigns_increasing_ids_and_persists() {
        let dir = TempDir::new().unwrap();
        let mut state = journal(&dir);

        let first = state.add_entry("  family dinner  ", "2024-06-14").unwrap().id;
        let second = state.add_entry("good book", "2024-06-15").unwrap().id;
        assert_eq!((first, second), (1, 2));
        assert_eq!(entry(&state, 1).content, "family dinner");

        let reloaded = JournalState::load_or_new(state.path().to_path_buf()).unwrap();
        assert_eq!(reloaded.get_entries(), state.get_entries());
    }

    #[test]
    fn blank_content_and_bad_dates_are_rejected() {
        let dir = TempDir::new().unwrap();
        let mut state = journal(&dir);

        assert!(matches!(
            state.add_entry("   ", "2024-06-14"),
            Err(JournalError::EmptyContent)
        ));
        assert!(matches!(
            state.add_entry("hello", "14.06.2024"),
            Err(JournalError::InvalidDate(d)) if d == "14.06.2024"
        ));
        assert!(state.is_empty());
        assert!(!state.path().exists());
    }

    #[test]
    fn update_keeps_id_and_creation_time() {
        let dir = TempDir::new().unwrap();
        let mut state = journal(&dir);
        let original = state.add_entry("rain", "2024-06-14").unwrap().clone();

        let mut edited = original.clone();
        edited.content = "warm rain".into();
        edited.date = "2024-06-13".into();
        state.update_entry(edited).unwrap();

        let stored = entry(&state, original.id);
        assert_eq!(stored.content, "warm rain");
        assert_eq!(stored.date, "2024-06-13");
        assert_eq!(stored.created_at, original.created_at);
    }

    #[test]
    fn update_and_delete_unknown_ids_fail() {
        let dir = TempDir::new().unwrap();
        let mut state = journal(&dir);

        let ghost = GratitudeEntry::new(42, "ghost".into(), "2024-06-14".into());
        assert!(matches!(state.update_entry(ghost), Err(JournalError::NotFound(42))));
        assert!(matches!(state.delete_entry(7), Err(JournalError::NotFound(7))));
    }

    #[test]
    fn delete_and_clear() {
        let dir = TempDir::new().unwrap();
        let mut state = journal(&dir);
        state.add_entry("one", "2024-06-13").unwrap();
        state.add_entry("two", "2024-06-14").unwrap();
        state.add_entry("three", "2024-06-15").unwrap();

        state.delete_entry(2).unwrap();
        assert_eq!(state.get_entries().len(), 2);

        assert_eq!(state.clear_entries().unwrap(), 2);
        assert!(state.is_empty());

        // ids keep counting after a clear
        assert_eq!(state.add_entry("four", "2024-06-16").unwrap().id, 4);
    }

    #[test]
    fn search_is_case_insensitive_newest_first() {
        let dir = TempDir::new().unwrap();
        let mut state = journal(&dir);
        state.add_entry("Tea with mum", "2024-06-10").unwrap();
        state.add_entry("quiet morning", "2024-06-11").unwrap();
        state.add_entry("green TEA", "2024-06-12").unwrap();

        let hits: Vec<u64> = state.search_entries("tea").iter().map(|e| e.id).collect();
        assert_eq!(hits, vec![3, 1]);
        assert_eq!(state.search_entries("").len(), 3);
    }

    #[test]
    fn missing_file_starts_empty_and_corrupt_file_errors() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("entries.json");

        let state = JournalState::load_or_new(path.clone()).unwrap();
        assert!(state.is_empty());

        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            JournalState::load_or_new(path),
            Err(JournalError::Serialize(_))
        ));
    }

    #[test]
    fn next_id_recovers_from_stale_counter() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("entries.json");
        fs::write(
            &path,
            r#"{"entries":[{"id":9,"content":"x","date":"2024-06-14"}],"next_id":1}"#,
        )
        .unwrap();

        let mut state = JournalState::load_from_file(path).unwrap();
        assert_eq!(state.add_entry("y", "2024-06-15").unwrap().id, 10);
    }

    #[test]
    fn failed_saves_leave_the_journal_unchanged() {
        let dir = TempDir::new().unwrap();
        let mut state = journal(&dir);
        state.add_entry("one", "2024-06-13").unwrap();
        state.add_entry("two", "2024-06-14").unwrap();
        let before = state.get_entries().to_vec();

        // A regular file where the journal's directory should be.
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "").unwrap();
        state.path = blocker.join("entries.json");

        assert!(matches!(
            state.add_entry("three", "2024-06-15"),
            Err(JournalError::Io(_))
        ));
        let mut edited = before[0].clone();
        edited.content = "changed".into();
        assert!(state.update_entry(edited).is_err());
        assert!(state.delete_entry(1).is_err());
        assert!(state.clear_entries().is_err());
        assert_eq!(state.get_entries(), before.as_slice());

        // The id handed out by the failed add is not skipped.
        state.path = dir.path().join("entries.json");
        assert_eq!(state.add_entry("three", "2024-06-15").unwrap().id, 3);
    }

    #[test]
    fn largest_id_on_disk_stops_new_entries() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("entries.json");
        fs::write(
            &path,
            r#"{"entries":[{"id":18446744073709551615,"content":"x","date":"2024-06-14"}],"next_id":1}"#,
        )
        .unwrap();

        let mut state = JournalState::load_from_file(path).unwrap();
        assert!(matches!(
            state.add_entry("y", "2024-06-15"),
            Err(JournalError::IdsExhausted)
        ));
        assert_eq!(state.get_entries().len(), 1);
    }

    #[test]
    fn missing_creation_times_are_written_back_once() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("entries.json");
        fs::write(
            &path,
            r#"{"entries":[{"id":1,"content":"x","date":"2024-06-14"}],"next_id":2}"#,
        )
        .unwrap();

        let first = JournalState::load_from_file(path.clone()).unwrap();
        assert!(fs::read_to_string(&path).unwrap().contains("created_at"));

        let second = JournalState::load_from_file(path).unwrap();
        assert_eq!(
            first.get_entries()[0].created_at,
            second.get_entries()[0].created_at
        );
    }

    #[test]
    fn streak_and_groups_follow_entries() {
        let dir = TempDir::new().unwrap();
        let mut state = journal(&dir);
        let today = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
        state.add_entry("a", "2024-06-15").unwrap();
        state.add_entry("b", "2024-06-15").unwrap();
        state.add_entry("c", "2024-06-14").unwrap();
        state.add_entry("d", "2024-06-12").unwrap();

        assert_eq!(state.streak(today), 2);
        assert_eq!(state.stats(today).longest_streak, 2);

        let groups = state.grouped_entries(&GratitudeFilter::default());
        assert_eq!(groups.len(), 3);
        assert_eq!(groups[0].0, "2024-06-15");
        assert_eq!(groups[0].1.len(), 2);
    }
}
