//! nutricare-auth
//!
//! Cognito identity collaborator: login, signup, logout, and current-user
//! extraction from JWT claims.

pub mod client;
pub mod error;
pub mod flows;
pub mod jwt;
