pub mod value;

// Re-export all public types
pub use value::{Logic, Value, ValueType};
