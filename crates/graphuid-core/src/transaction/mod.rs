//! Transaction error types shared across the graphuid crates.
//!
//! The concrete transaction machinery lives in `graphuid-graph`; the identifier
//! engine in `graphuid` reports its rejections through the
//! [`TransactionError::HookRejected`] variant defined here.

mod error;

pub use error::{HookError, TransactionError, TransactionResult};
