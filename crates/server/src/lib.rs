pub mod routes;
pub mod startup;
pub mod state;
pub mod errors;
pub mod envelope;
pub mod extract;
pub mod metrics;
pub mod openapi;

pub use startup::run;
