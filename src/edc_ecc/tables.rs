// Lookup tables shared by the EDC and ECC engines.
//
// The ECC pair maps a byte to its product with alpha in GF(2^8) (primitive
// polynomial 0x11D) and back again: `ecc_backward[x ^ ecc_forward[x]] == x`,
// i.e. `ecc_backward` divides by (alpha + 1). The EDC table is the reflected
// CRC table for the CD-ROM EDC polynomial.

use std::sync::OnceLock;

const GF8_PRIM_POLY: u32 = 0x11d; // x^8 + x^4 + x^3 + x^2 + 1
const EDC_POLY_REFLECTED: u32 = 0xd801_8001; // 0x8001801b bit-reversed

static SHARED_TABLES: OnceLock<Tables> = OnceLock::new();

/// Immutable lookup tables for EDC/ECC computation.
///
/// Build one with [`Tables::new`] or borrow the process-wide instance from [`init_tables`].
#[derive(Clone, PartialEq, Eq)]
pub struct Tables {
    ecc_forward: [u8; 256],
    ecc_backward: [u8; 256],
    edc: [u32; 256],
}

impl Tables {
    #[must_use]
    pub fn new() -> Self {
        let mut ecc_forward = [0u8; 256];
        let mut ecc_backward = [0u8; 256];
        let mut edc = [0u32; 256];

        for i in 0..256u32 {
            let j = (i << 1) ^ if i & 0x80 != 0 { GF8_PRIM_POLY } else { 0 };
            // Bit 8 of (i << 1) is always cancelled by the polynomial, so j fits in a byte
            ecc_forward[i as usize] = j as u8;
            ecc_backward[(i ^ j) as usize] = i as u8;

            let mut r = i;
            for _ in 0..8 {
                r = (r >> 1) ^ if r & 1 != 0 { EDC_POLY_REFLECTED } else { 0 };
            }
            edc[i as usize] = r;
        }

        Self { ecc_forward, ecc_backward, edc }
    }

    #[inline]
    #[must_use]
    pub fn ecc_forward(&self) -> &[u8; 256] {
        &self.ecc_forward
    }

    #[inline]
    #[must_use]
    pub fn ecc_backward(&self) -> &[u8; 256] {
        &self.ecc_backward
    }

    #[inline]
    #[must_use]
    pub fn edc(&self) -> &[u32; 256] {
        &self.edc
    }
}

impl Default for Tables {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Tables {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tables").finish_non_exhaustive()
    }
}

/// Returns the process-wide tables, building them on first use.
///
/// Safe to call from any number of threads; the tables are built exactly once and are never
/// observed partially initialized.
pub fn init_tables() -> &'static Tables {
    SHARED_TABLES.get_or_init(|| {
        log::debug!("Building EDC/ECC lookup tables");
        Tables::new()
    })
}
