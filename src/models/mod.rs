pub mod qr_code_record;
pub mod qr_payload;
pub mod role;
