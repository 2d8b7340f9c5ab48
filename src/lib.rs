pub mod config;
pub mod http;
pub mod importer;
pub mod runtime;
pub mod source;
