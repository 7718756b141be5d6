pub mod recommendation;
pub mod store;
