//! Domain services used by HTTP routes.
//!
//! ARCHITECTURE
//! ============
//! Service modules own business logic and persistence concerns so route
//! handlers can stay focused on request translation and session plumbing.

pub mod access;
pub mod board;
pub mod password;
pub mod session;
pub mod user;
pub mod validation;
