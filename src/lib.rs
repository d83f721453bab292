pub mod app;
pub mod auth;
pub mod config;
pub mod directory;
pub mod error;
pub mod nav;
pub mod reviews;
pub mod state;
pub mod store;
pub mod view;
