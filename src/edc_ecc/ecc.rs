// Reed-Solomon product code parity (ECMA-130 P and Q).
//
// Each major lane combines `minor_count` bytes read with a stride of `minor_inc`, wrapping
// around the `major_count * minor_count` span. Two accumulators run per lane: `b` is the plain
// XOR sum and `a` is the sum weighted by powers of alpha. The two parity bytes written for a lane
// make both syndromes of the extended codeword zero.

use super::tables::Tables;
use crate::error::{CodecError, CodecResult};

/// Interleave layout of one parity pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EccGeometry {
    pub major_count: usize,
    pub minor_count: usize,
    pub major_mult: usize,
    pub minor_inc: usize,
}

/// P parity: 86 columns of 24 bytes, 172 parity bytes.
pub const P_GEOMETRY: EccGeometry =
    EccGeometry { major_count: 86, minor_count: 24, major_mult: 2, minor_inc: 86 };

/// Q parity: 52 diagonals of 43 bytes, 104 parity bytes. Covers the P parity as well.
pub const Q_GEOMETRY: EccGeometry =
    EccGeometry { major_count: 52, minor_count: 43, major_mult: 86, minor_inc: 88 };

impl EccGeometry {
    /// Number of bytes interleaved by this pass.
    #[must_use]
    pub const fn size(&self) -> usize {
        self.major_count * self.minor_count
    }

    /// Number of parity bytes produced by this pass.
    #[must_use]
    pub const fn parity_len(&self) -> usize {
        2 * self.major_count
    }

    #[inline]
    const fn lane_start(&self, major: usize) -> usize {
        (major >> 1) * self.major_mult + (major & 1)
    }

    /// Checks that every read index stays within `[0, size)`.
    ///
    /// Lanes start below `size` and each step adds at most `size`, so a single subtraction
    /// brings the index back into range.
    pub fn validate(&self) -> CodecResult<()> {
        if self.major_count == 0 || self.minor_count == 0 {
            return Err(CodecError::InvalidGeometry("major and minor counts must be non-zero"));
        }

        let size = self.major_count.checked_mul(self.minor_count).ok_or(
            CodecError::InvalidGeometry("major_count * minor_count overflows"),
        )?;

        if self.minor_inc > size {
            return Err(CodecError::InvalidGeometry("minor_inc exceeds the interleaved span"));
        }

        // Even and odd lane starts each grow with `major`, so the last two lanes bound the rest
        let max_start = (self.major_count.saturating_sub(2)..self.major_count)
            .map(|major| {
                (major >> 1).checked_mul(self.major_mult).and_then(|s| s.checked_add(major & 1))
            })
            .try_fold(0, |max, start| start.map(|s| max.max(s)))
            .ok_or(CodecError::InvalidGeometry("lane start overflows"))?;
        if max_start >= size {
            return Err(CodecError::InvalidGeometry("lane start lies outside the interleaved span"));
        }

        Ok(())
    }
}

/// Computes one parity pass over `data` into `dest`.
///
/// `data` must be exactly `geometry.size()` bytes and `dest` exactly `geometry.parity_len()`
/// bytes. The first `major_count` bytes of `dest` receive the weighted parity of each lane and
/// the remaining `major_count` bytes its partner.
///
/// # Errors
///
/// Returns an error if the geometry is malformed or either buffer has the wrong length.
pub fn compute_ecc(
    tables: &Tables,
    data: &[u8],
    geometry: &EccGeometry,
    dest: &mut [u8],
) -> CodecResult<()> {
    geometry.validate()?;

    let size = geometry.size();
    if data.len() != size {
        return Err(CodecError::SpanMismatch {
            major_count: geometry.major_count,
            minor_count: geometry.minor_count,
            expected: size,
            actual: data.len(),
        });
    }
    if dest.len() != geometry.parity_len() {
        return Err(CodecError::ParityLength {
            expected: geometry.parity_len(),
            actual: dest.len(),
        });
    }

    let forward = tables.ecc_forward();
    let backward = tables.ecc_backward();
    let major_count = geometry.major_count;

    for major in 0..major_count {
        let mut index = geometry.lane_start(major);
        let mut ecc_a = 0u8;
        let mut ecc_b = 0u8;

        for _ in 0..geometry.minor_count {
            debug_assert!(index < size, "ECC read index {index} escaped span {size}");
            let byte = data[index];

            index += geometry.minor_inc;
            if index >= size {
                index -= size;
            }

            ecc_a ^= byte;
            ecc_b ^= byte;
            ecc_a = forward[ecc_a as usize];
        }

        ecc_a = backward[(forward[ecc_a as usize] ^ ecc_b) as usize];
        dest[major] = ecc_a;
        dest[major + major_count] = ecc_a ^ ecc_b;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gf_mul(tables: &Tables, mut a: u8, mut b: u8) -> u8 {
        let mut product = 0;
        while b != 0 {
            if b & 1 != 0 {
                product ^= a;
            }
            a = tables.ecc_forward()[a as usize];
            b >>= 1;
        }
        product
    }

    #[test]
    fn standard_geometries_are_valid() {
        P_GEOMETRY.validate().unwrap();
        Q_GEOMETRY.validate().unwrap();

        assert_eq!(P_GEOMETRY.size(), 2064);
        assert_eq!(P_GEOMETRY.parity_len(), 172);
        assert_eq!(Q_GEOMETRY.size(), 2236);
        assert_eq!(Q_GEOMETRY.parity_len(), 104);
    }

    #[test]
    fn wraparound_matches_hand_computed_parity() {
        let tables = Tables::new();

        // Lane 0 reads 0, 2, 4 after wrapping; lane 1 reads 1, 5, 3
        let geometry = EccGeometry { major_count: 2, minor_count: 3, major_mult: 2, minor_inc: 4 };
        let mut dest = [0u8; 4];
        compute_ecc(&tables, &[1, 2, 3, 4, 5, 6], &geometry, &mut dest).unwrap();
        assert_eq!(dest, [17, 0, 22, 0]);

        let geometry = EccGeometry { major_count: 3, minor_count: 3, major_mult: 2, minor_inc: 5 };
        let data = [0x10, 0x20, 0x30, 0x40, 0x50, 0x60, 0x70, 0x80, 0x90];
        let mut dest = [0u8; 6];
        compute_ecc(&tables, &data, &geometry, &mut dest).unwrap();
        assert_eq!(dest, [0xad, 0xe0, 0x6a, 0xfd, 0x80, 0x9a]);
    }

    #[test]
    fn parity_zeroes_both_syndromes() {
        let tables = Tables::new();
        let geometry = EccGeometry { major_count: 1, minor_count: 24, major_mult: 0, minor_inc: 1 };
        let data: Vec<u8> = (0..24u8).map(|i| i.wrapping_mul(37).wrapping_add(11)).collect();

        let mut dest = [0u8; 2];
        compute_ecc(&tables, &data, &geometry, &mut dest).unwrap();

        let codeword: Vec<u8> = data.iter().copied().chain(dest).collect();
        let plain = codeword.iter().fold(0, |acc, &c| acc ^ c);
        // Horner evaluation at alpha: highest power on the first byte
        let weighted = codeword.iter().fold(0u8, |acc, &c| gf_mul(&tables, acc, 2) ^ c);

        assert_eq!(plain, 0);
        assert_eq!(weighted, 0);
    }

    #[test]
    fn repeated_calls_are_identical() {
        let tables = Tables::new();
        let data: Vec<u8> = (0..P_GEOMETRY.size()).map(|i| (i * 7 + 3) as u8).collect();

        let mut first = vec![0u8; P_GEOMETRY.parity_len()];
        let mut second = vec![0xffu8; P_GEOMETRY.parity_len()];
        compute_ecc(&tables, &data, &P_GEOMETRY, &mut first).unwrap();
        compute_ecc(&tables, &data, &P_GEOMETRY, &mut second).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn zero_data_yields_zero_parity() {
        let tables = Tables::new();
        let data = vec![0u8; Q_GEOMETRY.size()];
        let mut dest = vec![0xaau8; Q_GEOMETRY.parity_len()];
        compute_ecc(&tables, &data, &Q_GEOMETRY, &mut dest).unwrap();

        assert!(dest.iter().all(|&b| b == 0));
    }

    #[test]
    fn rejects_mismatched_buffers() {
        let tables = Tables::new();
        let mut dest = vec![0u8; P_GEOMETRY.parity_len()];

        assert_eq!(
            compute_ecc(&tables, &[0u8; 2000], &P_GEOMETRY, &mut dest),
            Err(CodecError::SpanMismatch {
                major_count: 86,
                minor_count: 24,
                expected: 2064,
                actual: 2000,
            })
        );

        let data = vec![0u8; P_GEOMETRY.size()];
        assert_eq!(
            compute_ecc(&tables, &data, &P_GEOMETRY, &mut [0u8; 104]),
            Err(CodecError::ParityLength { expected: 172, actual: 104 })
        );
    }

    #[test]
    fn rejects_geometry_that_could_escape_span() {
        let empty = EccGeometry { major_count: 0, minor_count: 4, major_mult: 1, minor_inc: 1 };
        assert!(matches!(empty.validate(), Err(CodecError::InvalidGeometry(_))));

        let big_step = EccGeometry { major_count: 2, minor_count: 2, major_mult: 1, minor_inc: 5 };
        assert!(matches!(big_step.validate(), Err(CodecError::InvalidGeometry(_))));

        let far_lane = EccGeometry { major_count: 4, minor_count: 2, major_mult: 8, minor_inc: 1 };
        assert!(matches!(far_lane.validate(), Err(CodecError::InvalidGeometry(_))));
    }
}
