//! HTTP request handlers.

pub(crate) mod tournaments;
