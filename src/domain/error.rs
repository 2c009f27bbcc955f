use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("invalid document id `{id}`: {reason}")]
    InvalidIdentifier { id: String, reason: &'static str },
    #[error("invalid asset name `{name}`: {reason}")]
    InvalidAssetName { name: String, reason: &'static str },
}

impl DomainError {
    pub fn invalid_identifier(id: impl Into<String>, reason: &'static str) -> Self {
        Self::InvalidIdentifier {
            id: id.into(),
            reason,
        }
    }

    pub fn invalid_asset_name(name: impl Into<String>, reason: &'static str) -> Self {
        Self::InvalidAssetName {
            name: name.into(),
            reason,
        }
    }
}
