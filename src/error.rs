use std::io;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EntryError {
    #[error("Expected 6 digits (HHMMSS), got {0}")]
    WrongLength(usize),

    #[error("Time entry may only contain digits")]
    NotNumeric,

    #[error("Duration must be greater than 0")]
    Zero,
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("{0}")]
    IO(#[from] io::Error),

    #[error("Config Error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid duration: {0}")]
    Duration(String),

    #[error("Invalid time entry: {0}")]
    Entry(#[from] EntryError),

    #[error("Could not install signal handler: {0}")]
    Signal(#[from] ctrlc::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
