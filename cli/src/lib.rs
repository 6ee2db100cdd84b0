pub mod api;
pub mod auth;
pub mod cli;
pub mod commands;
pub mod config;
pub mod controller;
pub mod editor;
pub mod error;
pub mod logger;
pub mod models;
pub mod notify;
pub mod pagination;
pub mod storage;
pub mod validation;
pub mod views;

pub use error::{Error, Result};
