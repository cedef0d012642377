//! Lazy reader over the input sentence table.

use crate::models::{Result, ScrapeError, SentenceRecord};
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Lines, Write};
use std::path::Path;
use tracing::debug;

/// Lazy, re-openable stream of sentence records from a TSV file.
///
/// Yields records in file order and keeps no position of its own; resuming
/// is the checkpoint's job. Malformed rows (unparseable id, missing text)
/// are skipped, not fatal. Read errors are.
pub struct SentenceStream {
    lines: Lines<BufReader<File>>,
    lang_filter: Option<String>,
    line_no: usize,
}

impl SentenceStream {
    /// Open the table for one sequential pass.
    pub fn open(path: &Path, lang_filter: Option<String>) -> Result<Self> {
        let file = File::open(path)
            .map_err(|e| ScrapeError::io(format!("opening input table {}", path.display()), e))?;

        Ok(Self {
            lines: BufReader::new(file).lines(),
            lang_filter,
            line_no: 0,
        })
    }

    /// Parse one row. With a language filter the layout is id, lang, text
    /// (Tatoeba export); without, text is the second column and extra
    /// columns are ignored.
    fn parse_line(&self, line: &str) -> Option<SentenceRecord> {
        let mut fields = line.split('\t');
        let id = fields.next()?.trim().parse::<u64>().ok()?;
        let second = fields.next()?;

        let english = match &self.lang_filter {
            Some(lang) => {
                if second.trim() != lang {
                    return None;
                }
                fields.next()?
            }
            None => second,
        };

        let english = english.trim();
        if english.is_empty() {
            return None;
        }

        Some(SentenceRecord {
            id,
            english: english.to_string(),
        })
    }
}

impl Iterator for SentenceStream {
    type Item = Result<SentenceRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(e) => return Some(Err(ScrapeError::io("reading input table", e))),
            };
            self.line_no += 1;

            if line.trim().is_empty() {
                continue;
            }
            match self.parse_line(&line) {
                Some(record) => return Some(Ok(record)),
                None => debug!(line = self.line_no, "Skipping row without a usable record"),
            }
        }
    }
}

/// Copy `input` to `output` starting at the row whose id column equals
/// `from_id`, for carving a partially processed table into a fresh one.
///
/// Returns the number of rows written. When the id never appears, the
/// output is removed and an error returned.
pub fn split_from_id(input: &Path, output: &Path, from_id: u64) -> Result<usize> {
    let file = File::open(input)
        .map_err(|e| ScrapeError::io(format!("opening input table {}", input.display()), e))?;
    let reader = BufReader::new(file);

    let out = File::create(output)
        .map_err(|e| ScrapeError::io(format!("creating {}", output.display()), e))?;
    let mut writer = BufWriter::new(out);

    let needle = format!("{from_id}\t");
    let mut found = false;
    let mut written = 0usize;

    for line in reader.lines() {
        let line = line.map_err(|e| ScrapeError::io("reading input table", e))?;
        if !found && line.starts_with(&needle) {
            found = true;
        }
        if found {
            writeln!(writer, "{line}").map_err(|e| ScrapeError::io("writing split output", e))?;
            written += 1;
        }
    }

    writer
        .flush()
        .map_err(|e| ScrapeError::io("flushing split output", e))?;

    if !found {
        drop(writer);
        let _ = fs::remove_file(output);
        return Err(ScrapeError::IdNotFound(from_id));
    }

    Ok(written)
}
