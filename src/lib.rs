//! c9s - a terminal admin console for an e-commerce catalog API.
//!
//! The crate is split the way the app is layered:
//! - [`auth`]: persisted Basic-auth credential and the session gate
//! - [`cache`]: the shared time-boxed cache over the admin collections
//! - [`catalog`]: typed bindings for the remote admin API
//! - [`query`], [`event`], [`ui`], [`app`]: the terminal front end

pub mod app;
pub mod auth;
pub mod cache;
pub mod catalog;
pub mod commands;
pub mod config;
pub mod event;
pub mod query;
pub mod ui;
