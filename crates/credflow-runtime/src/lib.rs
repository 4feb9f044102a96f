//! Runtime for one identity agent: the admin HTTP transport, the ledger
//! registration client, the shared polling policy and the `AgentSession`
//! façade built on top of them.

pub mod admin;
pub mod ledger;
pub mod poll;
pub mod registration;
pub mod session;

#[cfg(test)]
pub(crate) mod testing;
