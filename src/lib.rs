pub mod auth;
pub mod db;
pub mod errors;
pub mod guard;
pub mod handlers;
pub mod models;
pub mod offline;
pub mod screens;
pub mod templates_structs;
