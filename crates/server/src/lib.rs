//! Bistro server library.
//!
//! This crate provides the ordering backend as a library, allowing it to be
//! tested and reused. The binary entrypoint lives in `main.rs`.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
