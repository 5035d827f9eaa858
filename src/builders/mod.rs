//! Builders to construct simulation components from configuration.

pub mod server_builder;

pub use server_builder::build_servers;
