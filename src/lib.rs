//! Loyalty card QR identity service: card numbers, signed QR payloads,
//! scan validation and QR image rendering behind an actix-web API.

pub mod config;
pub mod db;
pub mod handlers;
pub mod middlewares;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
pub mod structs;
pub mod utils;
