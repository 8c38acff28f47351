#![doc = include_str!("../README.md")]

mod config;
mod error;
mod keccak;
mod root;
mod scheduler;
mod splitter;
mod sponge;
mod stream;
mod worker;

mod rustcrypto_xof;

pub use config::{Config, Lanes};
pub use error::Error;
pub use rustcrypto_xof::Kt128Reader;
pub use stream::{Kt128, kt128};

pub use digest::{self, ExtendableOutput, Update, XofReader}; // For `Kt128` users

/// Size of the chunks the message is split into, in bytes.
pub const CHUNK_SIZE: usize = 8192;

/// Size of a chunk's chaining value in bytes.
pub const CV_SIZE: usize = 32;

/// TurboSHAKE128 rate in bytes.
const RATE: usize = 168;
