pub mod startup_api;

pub use startup_api::StartupApiProvider;
