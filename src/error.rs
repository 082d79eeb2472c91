//! Resource-level error types
//!
//! Every failure a lifecycle hook can produce is one of these variants.
//! Remote failures pass through as [`ResourceError::Api`] unmodified; they
//! fail the owning hook invocation and nothing else.

use crate::api::ApiError;
use crate::resource::lifecycle::{Action, Status};
use thiserror::Error;

pub type ResourceResult<T> = Result<T, ResourceError>;

#[derive(Error, Debug)]
pub enum ResourceError {
    /// Declared properties violate the schema or a cross-field rule.
    /// Raised before any network call.
    #[error("validation failed: {0}")]
    Validation(String),

    /// A read was requested for an attribute name outside the declared
    /// attributes schema.
    #[error("unknown attribute {name:?} for resource type {resource_type}")]
    UnknownAttribute { resource_type: String, name: String },

    /// The requested property change cannot be applied in place; the
    /// resource must be replaced.
    #[error("properties cannot be updated in place, the resource must be replaced")]
    UpdateReplace,

    /// A lifecycle hook was invoked from a state it cannot run in.
    #[error("cannot run {attempted:?} from state ({action:?}, {status:?})")]
    InvalidState {
        attempted: Action,
        action: Action,
        status: Status,
    },

    /// A confirmation poll exhausted its retry policy.
    #[error("timed out waiting for {0}")]
    Timeout(String),

    /// No resource definition is registered under the given type key.
    #[error("unknown resource type: {0}")]
    UnknownResourceType(String),

    /// Any remote admin API failure, propagated unmodified.
    #[error(transparent)]
    Api(#[from] ApiError),
}
