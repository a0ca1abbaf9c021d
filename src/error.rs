//! Unified error types for the YATRIK end-to-end suite

use thiserror::Error;

/// Unified Result type
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for the suite
///
/// Element lookups that find nothing are not errors at the engine layer; they
/// surface as [`crate::engine::Resolution::NotFound`] or `false`. The variants
/// below cover what an engine caller cannot recover from on its own.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The browser could not be acquired; aborts the scenario
    #[error("Session acquisition failed: {0}")]
    SessionAcquisition(String),

    /// Lifecycle operation attempted in the wrong state
    #[error("Invalid session state: {0}")]
    SessionState(String),

    /// An action needed an element and every locator of its chain failed
    #[error("Element not found: {0}")]
    ElementNotFound(String),

    /// The element handle no longer points into the current document
    #[error("Stale element: {0}")]
    StaleElement(String),

    /// The driver rejected a native interaction
    #[error("Element not interactable: {0}")]
    NotInteractable(String),

    /// Native and scripted interaction both failed
    #[error("Interaction rejected on {target}: {reason}")]
    InteractionRejected { target: String, reason: String },

    /// Script execution failed
    #[error("Script execution failed: {0}")]
    Script(String),

    /// Any other driver-level failure
    #[error("Driver error: {0}")]
    Driver(String),

    /// A scenario-level check failed
    #[error("Assertion failed [{check}]: {detail}")]
    Assertion { check: String, detail: String },
}

impl Error {
    /// Create a new configuration error
    pub fn configuration<S: Into<String>>(msg: S) -> Self {
        Error::Configuration(msg.into())
    }

    /// Create a new session acquisition error
    pub fn session_acquisition<S: Into<String>>(msg: S) -> Self {
        Error::SessionAcquisition(msg.into())
    }

    /// Create a new session state error
    pub fn session_state<S: Into<String>>(msg: S) -> Self {
        Error::SessionState(msg.into())
    }

    /// Create a new element not found error
    pub fn element_not_found<S: Into<String>>(target: S) -> Self {
        Error::ElementNotFound(target.into())
    }

    /// Create a new stale element error
    pub fn stale_element<S: Into<String>>(target: S) -> Self {
        Error::StaleElement(target.into())
    }

    /// Create a new not interactable error
    pub fn not_interactable<S: Into<String>>(target: S) -> Self {
        Error::NotInteractable(target.into())
    }

    /// Create a new interaction rejected error
    pub fn interaction_rejected<T: Into<String>, R: Into<String>>(target: T, reason: R) -> Self {
        Error::InteractionRejected {
            target: target.into(),
            reason: reason.into(),
        }
    }

    /// Create a new script error
    pub fn script<S: Into<String>>(msg: S) -> Self {
        Error::Script(msg.into())
    }

    /// Create a new driver error
    pub fn driver<S: Into<String>>(msg: S) -> Self {
        Error::Driver(msg.into())
    }

    /// Create a new assertion error
    pub fn assertion<C: Into<String>, D: Into<String>>(check: C, detail: D) -> Self {
        Error::Assertion {
            check: check.into(),
            detail: detail.into(),
        }
    }

    /// Whether a scripted retry may recover from this error
    pub fn is_interaction_rejection(&self) -> bool {
        matches!(self, Error::NotInteractable(_))
    }

    /// Whether this error only means "nothing matched right now"
    pub fn is_miss(&self) -> bool {
        matches!(self, Error::ElementNotFound(_) | Error::StaleElement(_))
    }
}
