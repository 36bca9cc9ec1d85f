//! Main module for semdom library functionality

pub mod builtin;
pub mod context;
pub mod dom;
pub mod engine;
pub mod plugin;
pub mod registry;
pub mod result;
pub mod stack;
pub mod tags;
