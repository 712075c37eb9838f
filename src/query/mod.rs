//! Request types consumed by the compiler.

pub mod filter;
pub mod request;

pub use filter::{canonicalize, Filter, FilterOperator, FilterValue};
pub use request::QueryRequest;
