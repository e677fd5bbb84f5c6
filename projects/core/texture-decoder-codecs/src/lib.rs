#![doc = include_str!(concat!("../", core::env!("CARGO_PKG_README")))]
#![cfg_attr(not(feature = "std"), no_std)]

pub mod astc;
pub mod atc;
pub mod bc1;
pub mod bc3;
pub mod bc4;
pub mod bc5;
pub mod bc6h;
pub mod bc7;
pub mod error;
pub mod etc;
pub mod pvrtc;
pub mod surface;

#[cfg(test)]
pub(crate) mod test_prelude;

pub use error::CodecError;
pub use surface::BlockLayout;
