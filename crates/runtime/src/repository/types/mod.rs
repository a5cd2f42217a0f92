//! Shared repository types.

mod record;

pub use record::SessionRecord;
