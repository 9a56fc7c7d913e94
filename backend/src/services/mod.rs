//! Business logic services for Fair Weather Friend

pub mod garden;
pub mod growth_refresh;
pub mod plant;
pub mod profile;
pub mod weather;

pub use garden::GardenService;
pub use growth_refresh::GrowthRefreshJob;
pub use plant::PlantService;
pub use profile::ProfileService;
pub use weather::WeatherService;
