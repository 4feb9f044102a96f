//! Core kernel for the credflow controller.
//!
//! The kernel drives an issuer and a holder session through a full
//! credential issuance run, loads configuration, and exposes session
//! operations as named commands.

pub mod commands;
pub mod config;
pub mod coordinator;
pub mod dispatcher;
pub mod error;

pub use coordinator::ExchangeCoordinator;
pub use dispatcher::CommandDispatcher;
