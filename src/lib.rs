pub mod app;
pub mod config;
pub mod db;
pub mod error;
pub mod members;
pub mod planets;
pub mod state;
pub mod validation;
