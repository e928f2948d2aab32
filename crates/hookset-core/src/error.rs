use thiserror::Error;

/// Rejected demand structure input.
///
/// Reads never fail; only construction validates its field list.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DemandError {
    #[error("alias '{alias}' is declared at both position {first} and position {second}")]
    DuplicateAlias {
        alias: String,
        first: usize,
        second: usize,
    },
    #[error("field at position {position} has an empty alias")]
    EmptyAlias { position: usize },
}
