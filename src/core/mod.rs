pub mod adapter;
pub mod path;

pub use adapter::StorageAdapter;
pub use path::{sanitize_key, storage_path};
