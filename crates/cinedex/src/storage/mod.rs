mod library;

pub use library::{sanitize_name, Library};
