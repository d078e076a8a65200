//! Stage schema validation.

pub(crate) mod validate;
