//! Reading log blobs from disk and decoding them into text.

pub mod file_source;

pub use file_source::{AsyncFileSource, FileSource};

use thiserror::Error;

/// Errors that can occur while obtaining log text
#[derive(Error, Debug)]
pub enum InputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Input is not valid UTF-8 text: {0}")]
    Decode(#[from] std::str::Utf8Error),
}

/// Decode a log blob as UTF-8, dropping a leading byte-order mark
pub fn decode(bytes: &[u8]) -> Result<&str, InputError> {
    let text = std::str::from_utf8(bytes)?;
    Ok(text.strip_prefix('\u{feff}').unwrap_or(text))
}

/// Owned variant of [`decode`]
pub fn decode_owned(bytes: Vec<u8>) -> Result<String, InputError> {
    let mut text = String::from_utf8(bytes).map_err(|e| InputError::Decode(e.utf8_error()))?;
    if text.starts_with('\u{feff}') {
        text.drain(..'\u{feff}'.len_utf8());
    }
    Ok(text)
}
