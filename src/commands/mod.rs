//! Command implementations for the wheelwright binary

pub(crate) mod bdist_wheel;
pub(crate) mod build;
pub(crate) mod completion;
pub(crate) mod platform;
pub(crate) mod tag;
