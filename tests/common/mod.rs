#![allow(dead_code)]

// Sectors dumped from pressed discs. Both are blank apart from sync, header, subheader and the
// EDC/ECC fields, so they are stored as (offset, byte) pairs over an all-zero sector.

pub const RAW_SECTOR_SIZE: usize = 2352;

/// "Les Chevaliers de Baphomet" disc 1, sector 00:02:14 (Mode 1).
const BAPHOMET_MODE1: &[(usize, u8)] = &[
    (13, 0x02), (14, 0x14), (15, 0x01),
    (2064, 0x9e), (2065, 0xdc), (2066, 0x20), (2067, 0x94),
    (2077, 0xf7), (2078, 0x18), (2079, 0xf5),
    (2150, 0xbf), (2151, 0x79), (2152, 0x60), (2153, 0xa1),
    (2163, 0xf5), (2164, 0x0c), (2165, 0xf4),
    (2236, 0x21), (2237, 0xa5), (2238, 0x40), (2239, 0x35),
    (2249, 0x41),
    (2270, 0xb3), (2271, 0xdd), (2272, 0xda), (2273, 0x20),
    (2274, 0x4d), (2275, 0x49), (2276, 0x24), (2277, 0xb4),
    (2294, 0x97), (2295, 0x65), (2296, 0xc5), (2297, 0xc2),
    (2298, 0x52), (2299, 0xe6), (2301, 0x43),
    (2322, 0x93), (2323, 0x49), (2324, 0x24), (2325, 0x5d),
    (2326, 0xb2), (2327, 0x05), (2328, 0x05), (2329, 0x11),
    (2346, 0x8f), (2347, 0x90), (2348, 0xc9), (2349, 0xc1),
    (2350, 0x46), (2351, 0x12),
];

/// "Metal Gear Solid" disc 1, sector 00:02:03 (Mode 2 Form 1).
const METAL_GEAR_FORM1: &[(usize, u8)] = &[
    (13, 0x02), (14, 0x03), (15, 0x02),
    (18, 0x08), (22, 0x08),
    (2072, 0x0b), (2073, 0x88), (2074, 0x81), (2075, 0x94),
    (2082, 0xfb), (2086, 0xfb),
    (2158, 0x1d), (2159, 0x85), (2160, 0x9e), (2161, 0xa1),
    (2168, 0xf3), (2172, 0xf3),
    (2244, 0x16), (2245, 0x0d), (2246, 0x1f), (2247, 0x35),
    (2262, 0x9e), (2263, 0xa1), (2264, 0x8e), (2265, 0x61),
    (2266, 0x72), (2267, 0xe3), (2268, 0x62), (2269, 0x23),
    (2286, 0xb9), (2288, 0xd2), (2290, 0xa5), (2292, 0x67), (2294, 0xa9),
    (2314, 0x1f), (2315, 0x35), (2316, 0x1b), (2317, 0x48),
    (2318, 0x70), (2319, 0x53), (2320, 0x74), (2321, 0x2e),
    (2338, 0x42), (2340, 0x21), (2342, 0x56), (2344, 0x94), (2346, 0xa1),
];

const SYNC_PATTERN: [u8; 12] = [
    0x00, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x00,
];

fn expand(bytes: &[(usize, u8)]) -> Vec<u8> {
    let mut sector = vec![0u8; RAW_SECTOR_SIZE];
    sector[..12].copy_from_slice(&SYNC_PATTERN);
    for &(offset, value) in bytes {
        sector[offset] = value;
    }
    sector
}

pub fn baphomet_mode1() -> Vec<u8> {
    expand(BAPHOMET_MODE1)
}

pub fn metal_gear_form1() -> Vec<u8> {
    expand(METAL_GEAR_FORM1)
}

/// Copy of `sector` with everything from `start` onwards zeroed.
pub fn strip_from(sector: &[u8], start: usize) -> Vec<u8> {
    let mut stripped = sector.to_vec();
    stripped[start..].fill(0);
    stripped
}
