//! Core types for the credflow agent controller.
//!
//! This crate defines the data structures shared by the runtime (one agent
//! session), the kernel (cross-agent choreography, command dispatch) and the
//! CLI. It contains no I/O.

pub mod command;
pub mod config;
pub mod connection;
pub mod error;
pub mod exchange;
pub mod identity;
pub mod ledger;
