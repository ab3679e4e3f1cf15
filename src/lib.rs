pub mod config;
pub mod db;
pub mod domain;
pub mod error;
pub mod services;
pub mod srs;

#[cfg(test)]
pub mod testing;
