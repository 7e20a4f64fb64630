//! Wheel tagging and packing

pub mod archive;
pub mod tag;

pub use archive::{WheelBuilder, WheelError};
pub use tag::{STABLE_ABI_TAG, TagError, TagTriple, WheelTagRewriter};
