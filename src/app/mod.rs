// Application layer: operator commands on top of the registry core.

pub mod commands;

pub use commands::execute;
