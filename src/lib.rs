pub mod data;
pub mod error;
pub mod process;
pub mod schema;
pub mod validate;
pub mod wasm;
