use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::SinkError;
use crate::normalize::NormalizedAdRecord;

/// Append-only destination for normalized records.
pub trait RecordSink {
    fn append(&mut self, record: &NormalizedAdRecord) -> Result<(), SinkError>;
    fn flush(&mut self) -> Result<(), SinkError>;
}

/// Newline-delimited JSON writer. Non-ASCII text is written as-is.
pub struct JsonlSink<W: Write> {
    out: W,
    written: usize,
}

impl JsonlSink<BufWriter<File>> {
    /// Create (or truncate) `path`, creating parent directories as needed.
    pub fn create(path: &Path) -> Result<Self, SinkError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let file = File::create(path)?;
        Ok(JsonlSink::new(BufWriter::new(file)))
    }
}

impl<W: Write> JsonlSink<W> {
    pub fn new(out: W) -> Self {
        JsonlSink { out, written: 0 }
    }

    pub fn written(&self) -> usize {
        self.written
    }

    /// Flush and hand back the underlying writer.
    pub fn finish(mut self) -> Result<W, SinkError> {
        self.out.flush()?;
        Ok(self.out)
    }
}

impl<W: Write> RecordSink for JsonlSink<W> {
    fn append(&mut self, record: &NormalizedAdRecord) -> Result<(), SinkError> {
        serde_json::to_writer(&mut self.out, record)?;
        self.out.write_all(b"\n")?;
        self.written += 1;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), SinkError> {
        self.out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize;
    use serde_json::json;

    #[test]
    fn one_line_per_record() {
        let mut sink = JsonlSink::new(Vec::new());
        sink.append(&normalize(&json!({"id": "1", "headline": "Lärare i Malmö"})))
            .unwrap();
        sink.append(&normalize(&json!({"id": "2"}))).unwrap();
        assert_eq!(sink.written(), 2);

        let bytes = sink.finish().unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("Lärare i Malmö"));
        assert!(!lines[0].contains("\\u00e4"));
        assert!(text.ends_with('\n'));
    }

    #[test]
    fn create_truncates_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("out.jsonl");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "stale\n").unwrap();

        let sink = JsonlSink::create(&path).unwrap();
        sink.finish().unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "");
    }
}
