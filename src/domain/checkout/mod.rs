//! Checkout data-callback validation

pub mod errors;
pub mod policy;
pub mod types;
pub mod validator;

pub use errors::{ErrorAccumulator, Field, FieldError, ValidationErrors, Violation};
pub use policy::{PolicyPreset, ValidationPolicy};
pub use types::{DataCallbackRequest, RequestedInfo, TransactionIntent, TransactionIntentEcho};
pub use validator::{CheckoutValidator, ValidationOutcome};
