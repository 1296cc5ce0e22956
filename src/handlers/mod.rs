pub mod health_handlers;
pub mod qr_handlers;
