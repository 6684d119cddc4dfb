//! An NNTP news server
//!
//! The core is a connection engine: accepted sockets are framed into
//! protocol lines, lines are dispatched to stateless or stateful command
//! handlers against per-connection session state, and an idle reaper
//! evicts connections that go quiet. Storage, peer replication, and the
//! mailing-list gateway are collaborators behind narrow traits.

pub mod auth;
pub mod command;
pub mod config;
pub mod constants;
pub mod feed;
pub mod gateway;
pub mod logging;
pub mod network;
pub mod protocol;
pub mod server;
pub mod session;
pub mod storage;
pub mod types;

pub use config::{load_config, load_or_create, Config};
pub use server::NntpServer;
