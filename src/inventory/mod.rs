//! Data model for an inventory run
//!
//! These types are shared by every stage of a run: configuration produces [`Account`]s and
//! [`Region`]s, the credential resolver produces [`Credentials`], collectors produce
//! [`CollectorResult`]s made of typed [`Record`]s, and the aggregator regroups them into the report.
//!
//! Each collector result is either `Found` with a [`Payload`] or `Failed` with a
//! [`CollectorFailure`] whose [`FailureKind`] lets callers branch on the cause rather than on
//! message text.

mod account;
mod collector_result;
mod credentials;
mod failure_kind;
mod field_value;
mod payload;
mod record;
mod region;

pub use account::Account;
pub use collector_result::{CollectorFailure, CollectorResult};
pub use credentials::Credentials;
pub use failure_kind::FailureKind;
pub use field_value::FieldValue;
pub use payload::Payload;
pub use record::{Record, RecordShape};
pub use region::Region;
