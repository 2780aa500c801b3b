//! Load stimuli from delimited text files
//!
//! One row per word. A header names the columns; `text_id`, `word_id` and
//! `word` are required, `frequency` is optional. Rows may come in any
//! order; words are placed by `word_id` within their text.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::core::error::{ReaderError, Result};
use crate::core::types::TextId;
use crate::stimulus::text::{pre_process_string, Text};
use crate::stimulus::Corpus;

/// Column positions resolved from the header row
struct Columns {
    text_id: usize,
    word_id: usize,
    word: usize,
    frequency: Option<usize>,
}

impl Columns {
    fn from_header(header: &str, separator: char) -> Result<Self> {
        let names: Vec<&str> = header.split(separator).map(|s| s.trim()).collect();
        let find = |name: &str| names.iter().position(|n| *n == name);
        let require = |name: &str| {
            find(name).ok_or_else(|| ReaderError::Stimulus {
                line: 1,
                reason: format!("missing column '{}'", name),
            })
        };

        Ok(Self {
            text_id: require("text_id")?,
            word_id: require("word_id")?,
            word: require("word")?,
            frequency: find("frequency"),
        })
    }
}

/// Parse a delimited stimulus table
pub fn parse_stimulus(content: &str, separator: char) -> Result<Corpus> {
    let mut lines = content.lines().enumerate().filter(|(_, l)| !l.trim().is_empty());

    let (_, header) = lines.next().ok_or_else(|| ReaderError::Stimulus {
        line: 1,
        reason: "empty stimulus file".into(),
    })?;
    let columns = Columns::from_header(header, separator)?;

    let mut texts: BTreeMap<u32, BTreeMap<usize, (String, Option<f64>)>> = BTreeMap::new();

    for (idx, line) in lines {
        let line_no = idx + 1;
        let fields: Vec<&str> = line.split(separator).collect();
        let field = |col: usize| {
            fields.get(col).map(|s| s.trim()).ok_or_else(|| ReaderError::Stimulus {
                line: line_no,
                reason: format!("expected at least {} fields, found {}", col + 1, fields.len()),
            })
        };

        let text_id: u32 = field(columns.text_id)?.parse().map_err(|e| ReaderError::Stimulus {
            line: line_no,
            reason: format!("bad text_id: {}", e),
        })?;
        let word_id: usize = field(columns.word_id)?.parse().map_err(|e| ReaderError::Stimulus {
            line: line_no,
            reason: format!("bad word_id: {}", e),
        })?;
        let word = pre_process_string(field(columns.word)?);
        if word.is_empty() {
            return Err(ReaderError::Stimulus {
                line: line_no,
                reason: "word is empty after pre-processing".into(),
            });
        }

        let frequency = match columns.frequency {
            Some(col) => {
                let raw = field(col)?;
                if raw.is_empty() {
                    None
                } else {
                    Some(raw.parse::<f64>().map_err(|e| ReaderError::Stimulus {
                        line: line_no,
                        reason: format!("bad frequency: {}", e),
                    })?)
                }
            }
            None => None,
        };

        let words = texts.entry(text_id).or_default();
        if words.insert(word_id, (word, frequency)).is_some() {
            return Err(ReaderError::Stimulus {
                line: line_no,
                reason: format!("duplicate word_id {} in text {}", word_id, text_id),
            });
        }
    }

    let mut corpus = Corpus::default();
    for (text_id, words) in texts {
        let expected: Vec<usize> = (0..words.len()).collect();
        let found: Vec<usize> = words.keys().copied().collect();
        if found != expected {
            return Err(ReaderError::Stimulus {
                line: 0,
                reason: format!("text {} word ids are not contiguous from 0", text_id),
            });
        }
        corpus.texts.push(Text::new(TextId(text_id), words.into_values().collect()));
    }

    tracing::info!("Loaded {} texts, {} words", corpus.texts.len(), corpus.word_count());
    Ok(corpus)
}

/// Load a stimulus table from disk
pub fn load_stimulus(path: &Path, separator: char) -> Result<Corpus> {
    let content = fs::read_to_string(path)?;
    parse_stimulus(&content, separator)
}
