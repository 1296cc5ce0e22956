pub mod card_number;
pub mod image_renderer;
pub mod jwt;
pub mod signer;
pub mod validation_cache;
pub mod verifier;
