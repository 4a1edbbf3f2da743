mod ecc;
mod edc;
mod tables;

pub use ecc::{compute_ecc, EccGeometry, P_GEOMETRY, Q_GEOMETRY};
pub use edc::{compute_edc, edc_value};
pub use tables::{init_tables, Tables};
