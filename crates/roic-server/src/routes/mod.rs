//! Route handlers, grouped by surface.

pub mod analysis;
pub mod health;
pub mod roic;
pub mod tools;
