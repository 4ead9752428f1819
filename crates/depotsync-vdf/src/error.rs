use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error("unterminated string starting on line {line}")]
    UnterminatedString { line: usize },

    #[error("unexpected '}}' on line {line}")]
    UnexpectedClose { line: usize },

    #[error("unexpected '{{' on line {line}: a section needs a key")]
    UnexpectedOpen { line: usize },

    #[error("key {key:?} on line {line} has no value")]
    MissingValue { key: String, line: usize },

    #[error("sections nested too deeply on line {line}")]
    TooDeep { line: usize },

    #[error("unclosed section {key:?}")]
    UnclosedSection { key: String },
}
