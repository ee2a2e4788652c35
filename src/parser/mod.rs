pub mod file_name;
pub mod key_parser;
