use thiserror::Error;

/// Errors produced when validating entity values.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("book {field} must not be blank")]
    BlankField { field: &'static str },

    #[error("bookcase layout must have at least one {0}")]
    EmptyLayout(&'static str),
}
