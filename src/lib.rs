//! Recomputes the EDC and ECC fields of raw 2352-byte CD-ROM sectors.
//!
//! [`edc_ecc`] holds the pure codec; [`sector`] applies it to the Mode 1 and Mode 2 (CD-XA)
//! layouts. The remaining modules drive whole disc images for the `cdrecalc` binary.

pub mod config;
pub mod edc_ecc;
pub mod error;
pub mod io;
pub mod parallel;
pub mod sector;

pub use config::RecalcConfig;
pub use error::{CodecError, CodecResult};
