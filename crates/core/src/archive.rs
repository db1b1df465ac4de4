//! Archive: every student's analysis history.
//!
//! The Archive is a plain value. Whoever owns it (the `Tutor` in the
//! tutor crate) mutates it through these methods and hands it to an
//! [`ArchiveStore`](crate::store::ArchiveStore) to persist.
//!
//! Invariants: a student is never removed, a history only grows, and a
//! record is never changed once appended. Nothing here hands out mutable
//! access to stored records.

use crate::error::{Error, Result};
use crate::record::Record;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Archive {
    students: BTreeMap<String, Vec<Record>>,
}

impl Archive {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open an empty history for `name`.
    ///
    /// Fails with `Validation` for a blank name and `DuplicateStudent` if the
    /// name is taken; the archive is left unchanged in both cases.
    pub fn create_student(&mut self, name: &str) -> Result<()> {
        if name.trim().is_empty() {
            return Err(Error::validation("student name must not be empty"));
        }
        if self.students.contains_key(name) {
            return Err(Error::DuplicateStudent(name.to_string()));
        }
        self.students.insert(name.to_string(), Vec::new());
        Ok(())
    }

    /// Append records to an existing history. Returns the new history length.
    pub fn append_records(
        &mut self,
        name: &str,
        records: impl IntoIterator<Item = Record>,
    ) -> Result<usize> {
        let history = self
            .students
            .get_mut(name)
            .ok_or_else(|| Error::UnknownStudent(name.to_string()))?;
        history.extend(records);
        Ok(history.len())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.students.contains_key(name)
    }

    pub fn history(&self, name: &str) -> Option<&[Record]> {
        self.students.get(name).map(Vec::as_slice)
    }

    /// Student names in sorted order.
    pub fn students(&self) -> impl Iterator<Item = &str> {
        self.students.keys().map(String::as_str)
    }

    /// Contents of every problem the teacher typed in for `name`, oldest first.
    pub fn problem_texts(&self, name: &str) -> Option<Vec<&str>> {
        self.history(name).map(|h| {
            h.iter()
                .filter(|r| r.is_submitted_problem())
                .map(|r| r.content.as_str())
                .collect()
        })
    }

    /// Number of students.
    pub fn len(&self) -> usize {
        self.students.len()
    }

    pub fn is_empty(&self) -> bool {
        self.students.is_empty()
    }

    /// Total records across all students.
    pub fn record_count(&self) -> usize {
        self.students.values().map(Vec::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::RecordKind;

    #[test]
    fn create_student_starts_empty() {
        let mut archive = Archive::new();
        archive.create_student("Alice").unwrap();
        assert_eq!(archive.history("Alice"), Some(&[][..]));
        assert_eq!(serde_json::to_value(&archive).unwrap(), serde_json::json!({"Alice": []}));
    }

    #[test]
    fn duplicate_student_is_a_noop() {
        let mut archive = Archive::new();
        archive.create_student("小明").unwrap();
        archive.append_records("小明", [Record::user("1+1=3")]).unwrap();
        let before = archive.clone();

        let err = archive.create_student("小明").unwrap_err();
        assert!(matches!(err, Error::DuplicateStudent(ref n) if n == "小明"));
        assert_eq!(archive, before);
    }

    #[test]
    fn blank_name_is_rejected() {
        let mut archive = Archive::new();
        assert!(matches!(archive.create_student(""), Err(Error::Validation(_))));
        assert!(matches!(archive.create_student("   "), Err(Error::Validation(_))));
        assert!(archive.is_empty());
    }

    #[test]
    fn append_is_monotonic_and_preserves_prior_records() {
        let mut archive = Archive::new();
        archive.create_student("Bob").unwrap();
        archive
            .append_records("Bob", [Record::user("q1"), Record::assistant("a1")])
            .unwrap();
        let prior = archive.history("Bob").unwrap().to_vec();

        let len = archive
            .append_records(
                "Bob",
                [
                    Record::user("q2"),
                    Record::assistant("a2"),
                    Record::image_analysis("拍照错题分析", "a3"),
                ],
            )
            .unwrap();

        assert_eq!(len, prior.len() + 3);
        let history = archive.history("Bob").unwrap();
        assert_eq!(&history[..prior.len()], prior.as_slice());
        assert_eq!(history[4].kind, RecordKind::ImageAnalysis);
    }

    #[test]
    fn append_to_unknown_student_fails() {
        let mut archive = Archive::new();
        let err = archive.append_records("Nobody", [Record::user("q")]).unwrap_err();
        assert!(matches!(err, Error::UnknownStudent(_)));
        assert!(archive.is_empty());
    }

    #[test]
    fn problem_texts_skip_replies_and_images() {
        let mut archive = Archive::new();
        archive.create_student("Carol").unwrap();
        archive
            .append_records(
                "Carol",
                [
                    Record::user("q1"),
                    Record::assistant("a1"),
                    Record::image_analysis("拍照错题分析", "img"),
                    Record::user("q2"),
                ],
            )
            .unwrap();
        assert_eq!(archive.problem_texts("Carol").unwrap(), vec!["q1", "q2"]);
        assert!(archive.problem_texts("Dave").is_none());
        assert_eq!(archive.record_count(), 4);
    }

    #[test]
    fn students_are_listed_in_order() {
        let mut archive = Archive::new();
        for name in ["Zoe", "Alice", "Mia"] {
            archive.create_student(name).unwrap();
        }
        assert_eq!(archive.students().collect::<Vec<_>>(), vec!["Alice", "Mia", "Zoe"]);
        assert_eq!(archive.len(), 3);
    }
}
