use super::tables::Tables;

/// Table-driven CD-ROM EDC (reflected CRC-32, polynomial 0x8001801B, zero init, no final XOR).
#[must_use]
pub fn edc_value(tables: &Tables, data: &[u8]) -> u32 {
    let table = tables.edc();

    data.iter().fold(0u32, |crc, &byte| {
        (crc >> 8) ^ table[((crc ^ u32::from(byte)) & 0xff) as usize]
    })
}

/// EDC of `data` in on-disc byte order (little-endian).
#[must_use]
pub fn compute_edc(tables: &Tables, data: &[u8]) -> [u8; 4] {
    edc_value(tables, data).to_le_bytes()
}
