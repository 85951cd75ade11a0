// Adapters layer: concrete implementations of the domain ports.

pub mod mysql;
pub mod page;
pub mod storage;
