pub mod apps;
pub mod cli;
pub mod commands;
pub mod config;
pub mod host;
pub mod icon;
pub mod module_prop;
pub mod package;
pub mod settings;
pub mod store;
