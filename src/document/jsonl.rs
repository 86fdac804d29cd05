//! JSONL document reader and writer.
//!
//! Each line in the file is a single JSON object:
//! ```jsonl
//! {"id": "2401.00001", "title": "...", "content": "...", "year": 2024, "embedding": [0.1, ...]}
//! ```
//!
//! Blank lines are skipped. A malformed line aborts the read with the line
//! number in the error message.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use log::debug;

use crate::document::Document;
use crate::error::{AtlasError, Result};

/// Read documents from a JSONL file.
pub fn read_jsonl<P: AsRef<Path>>(path: P) -> Result<Vec<Document>> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let documents = read_jsonl_from(BufReader::new(file))?;
    debug!("Read {} documents from {}", documents.len(), path.display());
    Ok(documents)
}

/// Read documents from any buffered reader of JSONL text.
pub fn read_jsonl_from<R: BufRead>(reader: R) -> Result<Vec<Document>> {
    let mut documents = Vec::new();

    for (line_num, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let mut doc: Document = serde_json::from_str(&line).map_err(|e| {
            AtlasError::serialization(format!("line {}: {}", line_num + 1, e))
        })?;
        doc.metadata.normalize_missing();
        documents.push(doc);
    }

    Ok(documents)
}

/// Write documents to a JSONL file, one object per line.
pub fn write_jsonl<P: AsRef<Path>>(path: P, documents: &[Document]) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    for doc in documents {
        serde_json::to_writer(&mut writer, doc)?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::vector::Vector;

    #[test]
    fn test_read_skips_blank_lines() {
        let text = "{\"id\":\"a\",\"embedding\":[1.0]}\n\n{\"id\":\"b\",\"embedding\":[0.5],\"doi\":\"nan\"}\n";
        let docs = read_jsonl_from(Cursor::new(text)).unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[1].id, "b");
        assert_eq!(docs[1].metadata.doi, "-");
    }

    #[test]
    fn test_read_reports_line_number() {
        let text = "{\"id\":\"a\",\"embedding\":[1.0]}\nnot json\n";
        let err = read_jsonl_from(Cursor::new(text)).unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn test_write_then_read_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("docs.jsonl");
        let docs = vec![
            Document::new("x", Vector::new(vec![0.6, 0.8])).with_content("abstract x"),
            Document::new("y", Vector::new(vec![1.0, 0.0])),
        ];
        write_jsonl(&path, &docs).unwrap();
        let loaded = read_jsonl(&path).unwrap();
        assert_eq!(loaded, docs);
    }
}
