use strum::EnumIs;
use thiserror::Error;

/// A single diagnostic produced while parsing textual IR.
///
/// Offsets are byte offsets into the parsed source.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParserError {
    /// File the source was read from, when known.
    pub file: Option<String>,
    pub start: usize,
    pub end: usize,
    pub message: String,
}

impl std::fmt::Display for ParserError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.file {
            Some(file) => write!(f, "{}:{}..{}: {}", file, self.start, self.end, self.message),
            None => write!(f, "{}..{}: {}", self.start, self.end, self.message),
        }
    }
}

#[derive(Debug, EnumIs, Error)]
pub enum Error {
    /// The input could not be read at all.
    #[error("Could not open input file `{path}`: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The input was read but is not a well-formed module.
    #[error("Module source contains {} syntax error(s).", .errors.len())]
    ParserErrors { errors: Vec<ParserError> },
}
