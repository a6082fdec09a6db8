pub mod catalog_file;
pub mod in_memory;
pub mod json_file;
