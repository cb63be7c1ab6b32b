//! Common types used across the application.

pub mod id;
pub mod money;
pub mod number;

pub use id::*;
pub use money::Amount;
pub use number::{AccountNumber, NumberParseError, PhoneNumber};
