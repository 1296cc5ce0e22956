pub mod errors;
pub mod qr_service;
