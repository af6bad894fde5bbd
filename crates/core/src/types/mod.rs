//! Value types shared by every crate in the workspace.

pub mod address;
pub mod email;
pub mod id;
pub mod money;
pub mod phone;
pub mod status;

pub use address::{Address, PartialAddress, PostalCode, PostalCodeError};
pub use email::{Email, EmailError};
pub use id::*;
pub use money::Money;
pub use phone::{Phone, PhoneError};
pub use status::*;
