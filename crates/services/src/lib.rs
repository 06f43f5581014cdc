pub mod code_blocks;
pub mod file_store;
