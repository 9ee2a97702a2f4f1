//! DNS MX resolution and mail-provider classification.
//!
//! [`mx_hosts`] is the lookup used on the verification path: it swallows
//! every resolution failure and returns an empty list. [`check_mx`] exposes
//! the full record set and the underlying error for diagnostics.

mod brand;
mod error;
mod resolver;
mod types;

pub use brand::{MxBrand, classify};
pub use error::MxError as Error;
pub use resolver::{LookupMx, build_resolver, check_mx, mx_hosts};
pub use types::{MxRecord, MxStatus};

#[cfg(test)]
pub(crate) mod tests;
