//! Genre label encoding
//!
//! Codes are assigned in first-seen order over the fitted sequence. The order
//! is part of the persisted artifact: refitting with a different ordering
//! changes the meaning of feature 0 for every stored tree.

use crate::errors::{PipelineError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Main genre of a pipe-delimited genre list (first token, trimmed)
pub fn main_genre(raw: &str) -> &str {
    raw.split('|').next().unwrap_or_default().trim()
}

/// Frozen mapping from main genre to a dense integer code
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "EncoderRepr", into = "EncoderRepr")]
pub struct GenreEncoder {
    classes: Vec<String>,
    index: HashMap<String, u32>,
}

/// On-disk form: the ordered vocabulary only
#[derive(Serialize, Deserialize)]
struct EncoderRepr {
    classes: Vec<String>,
}

impl From<EncoderRepr> for GenreEncoder {
    fn from(repr: EncoderRepr) -> Self {
        Self::from_classes(repr.classes)
    }
}

impl From<GenreEncoder> for EncoderRepr {
    fn from(encoder: GenreEncoder) -> Self {
        Self {
            classes: encoder.classes,
        }
    }
}

impl GenreEncoder {
    /// Fit the vocabulary from raw genre strings
    pub fn fit<I, S>(genres: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut classes: Vec<String> = Vec::new();
        let mut index = HashMap::new();

        for raw in genres {
            let genre = main_genre(raw.as_ref());
            if !index.contains_key(genre) {
                index.insert(genre.to_string(), classes.len() as u32);
                classes.push(genre.to_string());
            }
        }

        if classes.is_empty() {
            return Err(PipelineError::DataQuality(
                "cannot fit genre encoder on an empty column".into(),
            ));
        }

        Ok(Self { classes, index })
    }

    fn from_classes(classes: Vec<String>) -> Self {
        let index = classes
            .iter()
            .enumerate()
            .map(|(code, genre)| (genre.clone(), code as u32))
            .collect();
        Self { classes, index }
    }

    /// Code of a genre; raw pipe-delimited lists are reduced to their main genre
    pub fn transform(&self, genre: &str) -> Result<u32> {
        let genre = main_genre(genre);
        self.index
            .get(genre)
            .copied()
            .ok_or_else(|| PipelineError::UnknownCategory {
                genre: genre.to_string(),
            })
    }

    /// Genre for a code
    pub fn inverse(&self, code: u32) -> Option<&str> {
        self.classes.get(code as usize).map(String::as_str)
    }

    /// Vocabulary in code order
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Structural check applied after loading
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.classes.is_empty() {
            return Err("empty vocabulary".to_string());
        }
        if self.index.len() != self.classes.len() {
            return Err("duplicate genre in vocabulary".to_string());
        }
        Ok(())
    }
}
