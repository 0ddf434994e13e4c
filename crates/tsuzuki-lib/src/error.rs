use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error("unknown language key: {0}")]
    UnknownLanguage(String),
}
