#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StateError {
    #[error("unexpected end of input")]
    UnexpectedEof,
    #[error("invalid value: {0}")]
    InvalidValue(&'static str),
    #[error("length overflow")]
    LengthOverflow,
    #[error("{0} trailing bytes after decode")]
    TrailingBytes(usize),
}
