//! Domain models for Fair Weather Friend

mod garden;
mod plant;
mod profile;
mod weather;

pub use garden::*;
pub use plant::*;
pub use profile::*;
pub use weather::*;
