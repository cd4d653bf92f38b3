pub mod pagination;
pub mod persistence;
pub mod transport;
