pub mod memory_store;
pub mod object_store;
