//! Vmserve library - restricted static-file server for the VirtueMachine repository.

pub mod cli;
pub mod colors;
pub mod handlers;
pub mod middleware;
pub mod resolve;
pub mod state;
