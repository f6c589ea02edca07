pub mod nonce;
