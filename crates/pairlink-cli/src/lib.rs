pub mod commands;
pub mod workflow;
