use std::fs;
use std::path::Path;

use serde::Serialize;

use crate::Result;

/// One book pulled off a listing page. Only ever built with every field filled in.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookRecord {
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Author")]
    pub author: String,
    #[serde(rename = "Avg Rating")]
    pub avg_rating: f64,
    #[serde(rename = "Num Ratings")]
    pub num_ratings: u64,
}

impl BookRecord {
    /// Column order of the output file.
    pub const HEADERS: [&'static str; 4] = ["Title", "Author", "Avg Rating", "Num Ratings"];
}

/// Every record of a run, in page order and then row order. Duplicates are kept.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    records: Vec<BookRecord>,
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            records: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, record: BookRecord) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[BookRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, BookRecord> {
        self.records.iter()
    }

    /// Overwrites `path` with a header row followed by one row per record.
    /// The header is written even when there are no records. Missing parent
    /// directories are created.
    pub fn write_csv(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        // Header goes in by hand: serde headers only appear once a row is serialized.
        let mut wtr = csv::WriterBuilder::new()
            .has_headers(false)
            .from_path(path)?;
        wtr.write_record(BookRecord::HEADERS)?;
        for record in &self.records {
            wtr.serialize(record)?;
        }
        wtr.flush()?;
        Ok(())
    }
}

impl Extend<BookRecord> for Dataset {
    fn extend<I: IntoIterator<Item = BookRecord>>(&mut self, iter: I) {
        self.records.extend(iter);
    }
}

impl IntoIterator for Dataset {
    type Item = BookRecord;
    type IntoIter = std::vec::IntoIter<BookRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

impl<'a> IntoIterator for &'a Dataset {
    type Item = &'a BookRecord;
    type IntoIter = std::slice::Iter<'a, BookRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book(title: &str, author: &str, avg_rating: f64, num_ratings: u64) -> BookRecord {
        BookRecord {
            title: title.into(),
            author: author.into(),
            avg_rating,
            num_ratings,
        }
    }

    #[test]
    fn empty_dataset_writes_header_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("books.csv");

        Dataset::new().write_csv(&path).unwrap();

        let written = fs::read_to_string(&path).unwrap();
        assert_eq!(written, "Title,Author,Avg Rating,Num Ratings\n");
    }

    #[test]
    fn rows_follow_insertion_order_and_quote_commas() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("books.csv");

        let mut dataset = Dataset::new();
        dataset.push(book("The Hunger Games", "Suzanne Collins", 4.34, 7_225_847));
        dataset.extend([
            book("Pride and Prejudice", "Jane Austen", 4.29, 4_189_101),
            book("Eats, Shoots & Leaves", "Lynne Truss", 3.8, 81_000),
        ]);
        dataset.write_csv(&path).unwrap();

        let written = fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = written.lines().collect();
        assert_eq!(
            lines,
            [
                "Title,Author,Avg Rating,Num Ratings",
                "The Hunger Games,Suzanne Collins,4.34,7225847",
                "Pride and Prejudice,Jane Austen,4.29,4189101",
                "\"Eats, Shoots & Leaves\",Lynne Truss,3.8,81000",
            ]
        );
    }

    #[test]
    fn rewriting_replaces_previous_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("books.csv");
        fs::write(&path, "stale\nstale\nstale\n").unwrap();

        let mut dataset = Dataset::new();
        dataset.push(book("Dune", "Frank Herbert", 4.27, 1_500_000));
        dataset.write_csv(&path).unwrap();
        let first = fs::read(&path).unwrap();
        dataset.write_csv(&path).unwrap();
        let second = fs::read(&path).unwrap();

        assert_eq!(first, second);
        assert!(!String::from_utf8(second).unwrap().contains("stale"));
    }

    #[test]
    fn unwritable_target_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        // The target is a directory, so opening it as a file fails.
        assert!(Dataset::new().write_csv(dir.path()).is_err());
    }
}
