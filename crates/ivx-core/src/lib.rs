//! Core ivx library (interview session, transport client, round catalog, config).

pub mod api;
pub mod config;
pub mod rounds;
pub mod session;
