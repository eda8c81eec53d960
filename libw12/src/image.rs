use std::{fmt::Display, str::FromStr};

use thiserror::Error;

use crate::word::Word;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum LoadError {
    #[error("Missing header line")]
    MissingHeader,
    #[error("Malformed header line `{0}`")]
    BadHeader(String),
    #[error("Invalid word `{word}` on line {line}")]
    BadWord { word: String, line: usize },
    #[error("Header announces {expected} words, found {found}")]
    WrongLength { expected: usize, found: usize },
}

/// Assembled program: code words followed by data words.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Image {
    pub instructions: Vec<Word>,
    pub data: Vec<Word>,
}

impl Image {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_instruction(&mut self, words: &[Word]) {
        self.instructions.extend_from_slice(words);
    }

    pub fn push_data(&mut self, word: Word) {
        self.data.push(word);
    }

    pub fn len(&self) -> usize {
        self.instructions.len() + self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty() && self.data.is_empty()
    }

    pub fn words(&self) -> impl Iterator<Item = &Word> {
        self.instructions.iter().chain(self.data.iter())
    }
}

impl Display for Image {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{} {}", self.instructions.len(), self.data.len())?;
        for word in self.words() {
            writeln!(f, "{}", word.to_base64())?;
        }

        Ok(())
    }
}

fn parse_header(line: &str) -> Result<(usize, usize), LoadError> {
    let bad = || LoadError::BadHeader(line.to_owned());
    let (code, data) = line.trim().split_once(' ').ok_or_else(bad)?;
    Ok((
        code.trim().parse().map_err(|_| bad())?,
        data.trim().parse().map_err(|_| bad())?,
    ))
}

impl FromStr for Image {
    type Err = LoadError;

    fn from_str(object_text: &str) -> Result<Self, Self::Err> {
        let mut lines = object_text
            .lines()
            .enumerate()
            .filter(|(_, l)| !l.trim().is_empty());

        let (_, header) = lines.next().ok_or(LoadError::MissingHeader)?;
        let (code_len, data_len) = parse_header(header)?;

        let mut words = lines
            .map(|(line_no, l)| {
                Word::from_base64(l.trim()).ok_or_else(|| LoadError::BadWord {
                    word: l.to_owned(),
                    line: line_no + 1,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        if words.len() != code_len + data_len {
            return Err(LoadError::WrongLength {
                expected: code_len + data_len,
                found: words.len(),
            });
        }

        let data = words.split_off(code_len);

        Ok(Self {
            instructions: words,
            data,
        })
    }
}
