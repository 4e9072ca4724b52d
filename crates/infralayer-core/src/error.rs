pub type Result<T> = std::result::Result<T, Error>;

/// Construction-time failures. Runtime mutators never fail; stale or foreign input is ignored.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Duplicate layer ID \"{id}\"")]
    DuplicateLayerId { id: String },

    #[error("Invalid layer ID \"{id}\": IDs must be non-empty and must not contain ','")]
    InvalidLayerId { id: String },

    #[error("Layer \"{id}\" has an empty prefix")]
    EmptyPrefix { id: String },

    #[error(
        "Ambiguous layer prefixes: \"{prefix}\" ({id}) and \"{other_prefix}\" ({other_id}) can both match one layer name"
    )]
    AmbiguousPrefix {
        id: String,
        prefix: String,
        other_id: String,
        other_prefix: String,
    },

    #[error("Invalid controller config: {message}")]
    InvalidConfig { message: String },
}
