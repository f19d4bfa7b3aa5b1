//! Individual steps of a launch session.
//!
//! Each step is implemented as a separate module that the session in
//! [`crate::launcher`] calls in order.

pub mod check;
pub mod download;
pub mod handoff;
pub mod launch;
