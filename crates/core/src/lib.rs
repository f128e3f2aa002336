//! Functional core for gatehouse.
//!
//! Pure types, traits and functions shared by the auth layer and the server:
//! - `auth`: OAuth domain types, the provider abstraction and registry
//! - `store`: the key-value session store contract and its key conventions
//! - `users`: the read-only user repository contract

pub mod auth;
pub mod store;
pub mod users;
