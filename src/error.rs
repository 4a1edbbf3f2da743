use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("ECC geometry {major_count}x{minor_count} spans {expected} bytes, input is {actual}")]
    SpanMismatch { major_count: usize, minor_count: usize, expected: usize, actual: usize },
    #[error("ECC parity destination must be {expected} bytes, got {actual}")]
    ParityLength { expected: usize, actual: usize },
    #[error("Invalid ECC geometry: {0}")]
    InvalidGeometry(&'static str),
    #[error("Invalid raw sector size: expected {expected}, got {actual}")]
    SectorLength { expected: usize, actual: usize },
    #[error("LBA {lba} lies past the last addressable sector 99:59:74")]
    AddressOutOfRange { lba: u32 },
    #[error("Invalid ISO sector size: expected {expected}, got {actual}")]
    UserDataLength { expected: usize, actual: usize },
}

pub type CodecResult<T> = Result<T, CodecError>;
