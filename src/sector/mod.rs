//! Raw 2352-byte sector layout and per-sector EDC/ECC regeneration.

use std::fmt;
use std::ops::Range;

use crate::config::RecalcConfig;
use crate::edc_ecc::{self, Tables, P_GEOMETRY, Q_GEOMETRY};
use crate::error::{CodecError, CodecResult};

pub const ISO_SECTOR_SIZE: usize = 2048;
pub const RAW_SECTOR_SIZE: usize = 2352;

pub const SYNC_PATTERN: [u8; 12] = [
    0x00, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x00,
];

const HEADER: Range<usize> = 12..16;
const MODE_OFFSET: usize = 15;
const SUBMODE_OFFSET: usize = 18;
const SUBMODE_FORM2: u8 = 1 << 5;

// The ECC passes read from the header onwards
const ECC_START: usize = 12;
const P_PARITY: Range<usize> = 2076..2248;
const Q_PARITY: Range<usize> = 2248..2352;

const MODE1_EDC_DIGEST: Range<usize> = 0..2064;
const MODE1_EDC: Range<usize> = 2064..2068;
const MODE1_RESERVED: Range<usize> = 2068..2076;
const MODE1_USER_DATA: Range<usize> = 16..2064;

const FORM1_EDC_DIGEST: Range<usize> = 16..2072;
const FORM1_EDC: Range<usize> = 2072..2076;

const FORM2_EDC_DIGEST: Range<usize> = 16..2348;
const FORM2_EDC: Range<usize> = 2348..2352;

// CD-ROM addresses start at 2 seconds (150 frames)
const PREGAP_FRAMES: u32 = 150;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SectorKind {
    /// No sync pattern, or a mode byte this tool does not know. Never modified.
    Audio,
    Mode0,
    Mode1,
    Mode2Form1,
    Mode2Form2,
}

impl SectorKind {
    pub const ALL: [Self; 5] =
        [Self::Audio, Self::Mode0, Self::Mode1, Self::Mode2Form1, Self::Mode2Form2];

    /// Classifies a raw sector from its sync pattern, mode byte and CD-XA submode.
    ///
    /// Mode 2 sectors are assumed to carry a CD-XA subheader.
    #[must_use]
    pub fn detect(sector: &[u8]) -> Self {
        if sector.len() < RAW_SECTOR_SIZE || sector[..SYNC_PATTERN.len()] != SYNC_PATTERN {
            return Self::Audio;
        }

        match sector[MODE_OFFSET] {
            0x00 => Self::Mode0,
            0x01 => Self::Mode1,
            0x02 if sector[SUBMODE_OFFSET] & SUBMODE_FORM2 != 0 => Self::Mode2Form2,
            0x02 => Self::Mode2Form1,
            _ => Self::Audio,
        }
    }
}

impl fmt::Display for SectorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Audio => "audio",
            Self::Mode0 => "mode 0",
            Self::Mode1 => "mode 1",
            Self::Mode2Form1 => "mode 2 form 1",
            Self::Mode2Form2 => "mode 2 form 2",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectorAddress {
    pub minute: u8,
    pub second: u8,
    pub frame: u8,
}

impl SectorAddress {
    /// Highest LBA whose MSF address (99:59:74) still fits in two BCD digits per field.
    pub const MAX_LBA: u32 = 100 * 60 * 75 - 1 - PREGAP_FRAMES;

    /// # Errors
    ///
    /// Returns an error if `lba` is past [`Self::MAX_LBA`].
    pub fn from_lba(lba: u32) -> CodecResult<Self> {
        if lba > Self::MAX_LBA {
            return Err(CodecError::AddressOutOfRange { lba });
        }

        let lba_offset = lba + PREGAP_FRAMES;

        let frame = (lba_offset % 75) as u8;
        let second = ((lba_offset / 75) % 60) as u8;
        let minute = ((lba_offset / 75) / 60) as u8;

        Ok(Self { minute, second, frame })
    }

    pub fn to_bcd(&self) -> [u8; 3] {
        [to_bcd_byte(self.minute), to_bcd_byte(self.second), to_bcd_byte(self.frame)]
    }
}

fn to_bcd_byte(value: u8) -> u8 {
    ((value / 10) << 4) | (value % 10)
}

/// Outcome of comparing a sector's stored EDC/ECC with freshly computed values.
///
/// Fields a sector kind does not carry are reported as valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectorCheck {
    pub kind: SectorKind,
    pub edc_ok: bool,
    pub ecc_ok: bool,
}

impl SectorCheck {
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.edc_ok && self.ecc_ok
    }
}

fn raw_sector_len(sector: &[u8]) -> CodecResult<()> {
    if sector.len() != RAW_SECTOR_SIZE {
        return Err(CodecError::SectorLength { expected: RAW_SECTOR_SIZE, actual: sector.len() });
    }
    Ok(())
}

fn write_edc(tables: &Tables, sector: &mut [u8], digest: Range<usize>, location: Range<usize>) {
    let edc = edc_ecc::compute_edc(tables, &sector[digest]);
    sector[location].copy_from_slice(&edc);
}

/// Runs the P pass and then the Q pass, which also covers the fresh P parity.
fn write_ecc(tables: &Tables, sector: &mut [u8]) -> CodecResult<()> {
    let (p_source, p_parity) = sector[ECC_START..Q_PARITY.start].split_at_mut(P_GEOMETRY.size());
    edc_ecc::compute_ecc(tables, p_source, &P_GEOMETRY, p_parity)?;

    let (q_source, q_parity) = sector[ECC_START..].split_at_mut(Q_GEOMETRY.size());
    edc_ecc::compute_ecc(tables, q_source, &Q_GEOMETRY, q_parity)?;

    Ok(())
}

/// Mode 2 Form 1 ECC is computed as if the header were all zero.
fn write_ecc_without_header(tables: &Tables, sector: &mut [u8]) -> CodecResult<()> {
    let mut header = [0u8; 4];
    header.copy_from_slice(&sector[HEADER]);
    sector[HEADER].fill(0);

    let result = write_ecc(tables, sector);

    sector[HEADER].copy_from_slice(&header);
    result
}

/// Recomputes the EDC/ECC fields of `sector` in place according to its detected kind.
///
/// # Errors
///
/// Returns an error if `sector` is not exactly [`RAW_SECTOR_SIZE`] bytes.
pub fn regenerate(
    tables: &Tables,
    sector: &mut [u8],
    config: &RecalcConfig,
) -> CodecResult<SectorKind> {
    let kind = SectorKind::detect(sector);
    regenerate_as(tables, sector, kind, config)?;
    Ok(kind)
}

/// Recomputes the EDC/ECC fields of `sector` in place, treating it as `kind`.
///
/// # Errors
///
/// Returns an error if `sector` is not exactly [`RAW_SECTOR_SIZE`] bytes.
pub fn regenerate_as(
    tables: &Tables,
    sector: &mut [u8],
    kind: SectorKind,
    config: &RecalcConfig,
) -> CodecResult<()> {
    raw_sector_len(sector)?;

    match kind {
        SectorKind::Audio | SectorKind::Mode0 => {}
        SectorKind::Mode1 => {
            write_edc(tables, sector, MODE1_EDC_DIGEST, MODE1_EDC);
            sector[MODE1_RESERVED].fill(0);
            write_ecc(tables, sector)?;
        }
        SectorKind::Mode2Form1 => {
            write_edc(tables, sector, FORM1_EDC_DIGEST, FORM1_EDC);
            write_ecc_without_header(tables, sector)?;
        }
        SectorKind::Mode2Form2 => {
            if config.form2_edc {
                write_edc(tables, sector, FORM2_EDC_DIGEST, FORM2_EDC);
            }
        }
    }

    Ok(())
}

/// Compares the stored EDC/ECC of `sector` against recomputed values without modifying it.
///
/// A Form 2 sector whose stored EDC is all zero passes, since that field is optional. With
/// `form2_edc` disabled, Form 2 EDC is not checked at all.
///
/// # Errors
///
/// Returns an error if `sector` is not exactly [`RAW_SECTOR_SIZE`] bytes.
pub fn check(tables: &Tables, sector: &[u8], config: &RecalcConfig) -> CodecResult<SectorCheck> {
    raw_sector_len(sector)?;

    let kind = SectorKind::detect(sector);
    let mut scratch = [0u8; RAW_SECTOR_SIZE];
    scratch.copy_from_slice(sector);
    regenerate_as(tables, &mut scratch, kind, config)?;

    let matches = |range: Range<usize>| sector[range.clone()] == scratch[range];
    let ecc_matches = || matches(P_PARITY) && matches(Q_PARITY);

    let (edc_ok, ecc_ok) = match kind {
        SectorKind::Audio | SectorKind::Mode0 => (true, true),
        SectorKind::Mode1 => (matches(MODE1_EDC), ecc_matches()),
        SectorKind::Mode2Form1 => (matches(FORM1_EDC), ecc_matches()),
        SectorKind::Mode2Form2 => {
            let stored_zero = sector[FORM2_EDC].iter().all(|&b| b == 0);
            (stored_zero || matches(FORM2_EDC), true)
        }
    };

    Ok(SectorCheck { kind, edc_ok, ecc_ok })
}

/// Builds a complete Mode 1 raw sector for `lba` around 2048 bytes of user data.
///
/// # Errors
///
/// Returns an error if `user_data` is not exactly [`ISO_SECTOR_SIZE`] bytes or `lba` has no
/// valid MSF address.
pub fn build_mode1_sector(tables: &Tables, lba: u32, user_data: &[u8]) -> CodecResult<Vec<u8>> {
    if user_data.len() != ISO_SECTOR_SIZE {
        return Err(CodecError::UserDataLength {
            expected: ISO_SECTOR_SIZE,
            actual: user_data.len(),
        });
    }

    let mut sector = vec![0u8; RAW_SECTOR_SIZE];
    sector[..SYNC_PATTERN.len()].copy_from_slice(&SYNC_PATTERN);

    let [minute, second, frame] = SectorAddress::from_lba(lba)?.to_bcd();
    sector[HEADER].copy_from_slice(&[minute, second, frame, 0x01]);
    sector[MODE1_USER_DATA].copy_from_slice(user_data);

    regenerate_as(tables, &mut sector, SectorKind::Mode1, &RecalcConfig::default())?;

    Ok(sector)
}
