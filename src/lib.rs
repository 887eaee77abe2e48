//! CareBridge - content management backend for a health-focused NGO website
//!
//! This library provides the core functionality for the CareBridge system:
//! public content APIs, the role-gated admin surface, uploads, the user sync
//! bridge, and the content event stream.

pub mod api;
pub mod config;
pub mod db;
pub mod events;
pub mod identity;
pub mod models;
pub mod services;
