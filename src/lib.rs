pub mod checkers;
pub mod configuration;
pub mod health;
pub mod routes;
pub mod startup;
pub mod telemetry;
