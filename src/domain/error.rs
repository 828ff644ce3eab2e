use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DomainError {
    #[error("post record has no identifier")]
    MissingId,
    #[error("post `{id}` has no usable `{field}` coordinate")]
    InvalidCoordinate { id: String, field: &'static str },
    #[error("duplicate post identifier `{id}`")]
    DuplicateId { id: String },
}

impl DomainError {
    pub fn invalid_coordinate(id: impl Into<String>, field: &'static str) -> Self {
        Self::InvalidCoordinate {
            id: id.into(),
            field,
        }
    }
}
