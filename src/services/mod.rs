//! Domain services behind the HTTP routes.
//!
//! | Module | Role |
//! |--------|------|
//! | [`project`] | Project lookup, scene payload assembly, scene save |
//! | [`sketch`] | Sketch files and rows, technical task stubs |
//! | [`storage`] | Project folder tree, mesh listing, public URLs |

pub mod project;
pub mod sketch;
pub mod storage;
