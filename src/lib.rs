//! Dentview project service.
//!
//! Serves project scene state, mesh file listings and sketch persistence to
//! the browser viewer. The measurement engine itself lives in the `viewer`
//! crate; this crate only stores what it produces.
//!
//! | Module | Role |
//! |--------|------|
//! | [`config`] | Environment configuration |
//! | [`db`] | Pool setup and migrations |
//! | [`routes`] | Axum router and handlers |
//! | [`services`] | Project, sketch and storage logic |
//! | [`state`] | Shared handler state |

pub mod config;
pub mod db;
pub mod routes;
pub mod services;
pub mod state;
