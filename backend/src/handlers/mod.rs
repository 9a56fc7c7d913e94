//! HTTP handlers

pub mod garden;
pub mod health;
pub mod plant;
pub mod weather;

pub use garden::*;
pub use health::*;
pub use plant::*;
pub use weather::*;
