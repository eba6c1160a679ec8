pub mod auth;
pub mod config;
pub mod controllers;
pub mod db;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod service;
pub mod state;

#[cfg(test)]
mod test_support;
