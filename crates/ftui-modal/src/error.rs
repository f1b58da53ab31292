#![forbid(unsafe_code)]

//! Error type shared by the store, manager, and policy loaders.

/// Errors surfaced by modal requests and configuration.
///
/// Closing an absent key is deliberately not represented here: it is a
/// tolerated no-op.
#[derive(Debug, thiserror::Error)]
pub enum ModalError {
    /// A request (explicit or via the configured default) named a variant
    /// that is not registered.
    #[error("unknown modal variant `{requested}`; valid variants: {}", .available.join(", "))]
    UnknownVariant {
        requested: String,
        available: Vec<String>,
    },
    /// The manager was configured without any variant.
    #[error("modal manager requires at least one variant")]
    NoVariants,
    /// A JSON value used as settings or props was not an object.
    #[error("expected a JSON object for modal settings or props")]
    NotAnObject,
    /// A prompt payload or JSON policy could not be decoded.
    #[error("failed to decode modal data: {0}")]
    Decode(#[from] serde_json::Error),
    /// A TOML policy file could not be parsed.
    #[cfg(feature = "policy-config")]
    #[error("failed to parse modal policy: {0}")]
    Config(#[from] toml::de::Error),
}

/// Result alias used throughout the crate.
pub type Result<T, E = ModalError> = std::result::Result<T, E>;
