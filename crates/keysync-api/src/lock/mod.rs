pub mod auth;
pub mod client;
pub mod codes;
pub mod models;

pub use client::LockClient;
