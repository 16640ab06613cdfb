pub mod api;
pub mod attendance;
pub mod config;
pub mod db;
pub mod documents;
pub mod error;
pub mod models;
pub mod services;
pub mod state;
pub mod storage;
pub mod view;
