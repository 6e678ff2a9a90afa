use thiserror::Error;

/// Record kinds named in errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Item,
    Buyer,
}

impl std::fmt::Display for Resource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Resource::Item => f.write_str("item"),
            Resource::Buyer => f.write_str("buyer"),
        }
    }
}

/// Domain-specific errors using thiserror
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("missing required fields: {}", fields.join(", "))]
    MissingFields { fields: Vec<&'static str> },

    #[error("{resource} already exists: {key}")]
    AlreadyExists { resource: Resource, key: String },

    #[error("{resource} not found: {id}")]
    NotFound { resource: Resource, id: String },

    #[error("buyer {buyer_id} is not interested in item {item_id}")]
    NotModified { item_id: String, buyer_id: String },

    #[error("storage error: {message}")]
    Storage { message: String },
}

impl DomainError {
    pub fn missing_fields(fields: Vec<&'static str>) -> Self {
        Self::MissingFields { fields }
    }

    pub fn already_exists(resource: Resource, key: impl Into<String>) -> Self {
        Self::AlreadyExists {
            resource,
            key: key.into(),
        }
    }

    pub fn item_not_found(id: impl Into<String>) -> Self {
        Self::NotFound {
            resource: Resource::Item,
            id: id.into(),
        }
    }

    pub fn buyer_not_found(id: impl Into<String>) -> Self {
        Self::NotFound {
            resource: Resource::Buyer,
            id: id.into(),
        }
    }

    pub fn not_modified(item_id: impl Into<String>, buyer_id: impl Into<String>) -> Self {
        Self::NotModified {
            item_id: item_id.into(),
            buyer_id: buyer_id.into(),
        }
    }

    pub fn storage(err: &anyhow::Error) -> Self {
        Self::Storage {
            // alternate form keeps the context chain
            message: format!("{err:#}"),
        }
    }
}
