// Snapshot handling: untrusted-input coercion and the share-link codec

pub mod normalize;
pub mod share;

pub use normalize::*;
pub use share::*;
