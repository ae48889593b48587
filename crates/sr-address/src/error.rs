use thiserror::Error;

#[derive(Debug, Error)]
pub enum AddressError {
    #[error("query {0:?} is too short")]
    EmptyQuery(String),

    #[error("address source is empty: {skipped} record(s) read, none usable")]
    NoRecords { skipped: usize },

    #[error("address parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type AddressResult<T> = Result<T, AddressError>;
