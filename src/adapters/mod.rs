// Adapters layer: concrete feed sources and document stores behind the domain ports.

pub mod http;
pub mod memory;
pub mod sqlite;
