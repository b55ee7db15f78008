//! Structured error types for propview.
//!
//! Four classes, matching how each one is handled:
//! - [`ValidationError`]: a mutation was rejected before anything changed.
//! - [`PersistenceError`]: storage read/write failed; callers degrade to
//!   in-memory state or the canonical default.
//! - [`AssetLoadError`]: an image/resource is missing; documents substitute
//!   a placeholder.
//! - [`GenerationError`]: building a document failed; the only class that
//!   surfaces to the user.

/// A mutation input was rejected. Nothing was applied.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    /// A numeric field was negative.
    #[error("{field} must be non-negative (got {value})")]
    Negative { field: &'static str, value: f64 },

    /// A numeric field was NaN or infinite.
    #[error("{field} must be a finite number")]
    NonFinite { field: &'static str },

    /// A rate field fell outside `0.0..=1.0`.
    #[error("{field} must be between 0 and 1 (got {value})")]
    RateOutOfRange { field: &'static str, value: f64 },

    /// An update targeted an id that is not in the collection.
    #[error("no item with id {id} in {collection}")]
    UnknownItem { collection: &'static str, id: u32 },

    /// A grid edit carried text that is not a number.
    #[error("{field} expects a number (got {value:?})")]
    NotANumber { field: &'static str, value: String },

    /// A grid edit targeted a column that does not exist.
    #[error("unknown field {field:?} in {collection}")]
    UnknownField {
        collection: &'static str,
        field: String,
    },

    /// A grid edit targeted a computed column.
    #[error("{field} is computed and cannot be edited")]
    ReadOnlyField { field: String },

    /// A tax rate was set on a section that carries no tax.
    #[error("{section} is not taxed")]
    NotTaxable { section: &'static str },

    /// A derived amount overflowed to infinity.
    #[error("{field} is too large to represent")]
    Overflow { field: &'static str },

    /// The collection's largest id is `u32::MAX`; no further id exists.
    #[error("no ids left in {collection}")]
    IdSpaceExhausted { collection: &'static str },

    /// Two records of one collection share an id (loaded data only).
    #[error("duplicate id {id} in {collection}")]
    DuplicateId { collection: &'static str, id: u32 },
}

/// Storage read/write failure.
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    /// The backing store is not reachable (no window, private mode, ...).
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// The backing store refused the write.
    #[error("storage write failed: {0}")]
    Write(String),

    /// The backing store could not be read.
    #[error("storage read failed: {0}")]
    Read(String),

    /// Snapshot (de)serialization failed.
    #[error("snapshot encoding: {0}")]
    Json(#[from] serde_json::Error),

    /// The stored blob parsed but failed validation.
    #[error("stored snapshot is invalid: {0}")]
    Invalid(#[from] ValidationError),

    /// File-backed storage I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A document asset could not be loaded.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AssetLoadError {
    /// No asset registered under this name.
    #[error("asset not found: {0}")]
    NotFound(String),

    /// The asset exists but could not be fetched or read.
    #[error("asset {name} failed to load: {reason}")]
    Fetch { name: String, reason: String },
}

/// Document or spreadsheet generation failed.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    /// A generation is already in flight.
    #[error("a document is already being generated")]
    AlreadyRunning,

    /// The PDF writer failed.
    #[error("PDF output failed: {0}")]
    Pdf(String),

    /// ZIP packaging of a workbook failed.
    #[error("ZIP archive: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// I/O error while writing output.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// All errors that can occur in propview.
#[derive(Debug, thiserror::Error)]
pub enum PropviewError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    #[error(transparent)]
    AssetLoad(#[from] AssetLoadError),

    #[error(transparent)]
    Generation(#[from] GenerationError),

    /// Configuration could not be parsed.
    #[error("configuration: {0}")]
    Config(#[from] toml::de::Error),

    /// Configuration parsed but holds an unusable value.
    #[error("invalid config value for {field}: {reason}")]
    InvalidConfig { field: &'static str, reason: String },
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, PropviewError>;

/// Check that `value` is finite and not negative.
pub(crate) fn ensure_non_negative(
    field: &'static str,
    value: f64,
) -> std::result::Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NonFinite { field });
    }
    if value < 0.0 {
        return Err(ValidationError::Negative { field, value });
    }
    Ok(())
}

/// Check that `quantity * unit_price` stays finite.
pub(crate) fn ensure_finite_total(
    quantity: f64,
    unit_price: f64,
) -> std::result::Result<(), ValidationError> {
    if (quantity * unit_price).is_finite() {
        Ok(())
    } else {
        Err(ValidationError::Overflow { field: "total" })
    }
}

/// Check that `value` is a finite rate in `0.0..=1.0`.
pub(crate) fn ensure_rate(field: &'static str, value: f64) -> std::result::Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NonFinite { field });
    }
    if !(0.0..=1.0).contains(&value) {
        return Err(ValidationError::RateOutOfRange { field, value });
    }
    Ok(())
}

#[cfg(target_arch = "wasm32")]
impl From<PropviewError> for wasm_bindgen::JsValue {
    fn from(e: PropviewError) -> Self {
        wasm_bindgen::JsValue::from_str(&e.to_string())
    }
}
