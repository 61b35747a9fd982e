//! Country resolution from ICAO 24-bit station addresses.
//!
//! Addresses are allocated to states in contiguous blocks. This table
//! covers the common blocks; anything outside it resolves to `None`
//! rather than guessing.

/// (start, end, country): inclusive address ranges, sorted by start.
const COUNTRY_BLOCKS: &[(u32, u32, &str)] = &[
    (0x004000, 0x0043FF, "Zimbabwe"),
    (0x006000, 0x006FFF, "Mozambique"),
    (0x008000, 0x00FFFF, "South Africa"),
    (0x010000, 0x017FFF, "Egypt"),
    (0x018000, 0x01FFFF, "Libya"),
    (0x020000, 0x027FFF, "Morocco"),
    (0x028000, 0x02FFFF, "Tunisia"),
    (0x044000, 0x044FFF, "Ghana"),
    (0x04C000, 0x04CFFF, "Kenya"),
    (0x060000, 0x067FFF, "Nigeria"),
    (0x068000, 0x06FFFF, "Algeria"),
    (0x080000, 0x087FFF, "Colombia"),
    (0x088000, 0x08FFFF, "Venezuela"),
    (0x0A0000, 0x0A7FFF, "Mexico"),
    (0x0A8000, 0x0AFFFF, "Peru"),
    (0x0B0000, 0x0B7FFF, "Chile"),
    (0x0D0000, 0x0D7FFF, "Cuba"),
    (0x100000, 0x1FFFFF, "Russia"),
    (0x300000, 0x33FFFF, "Italy"),
    (0x340000, 0x37FFFF, "Spain"),
    (0x380000, 0x3BFFFF, "France"),
    (0x3C0000, 0x3FFFFF, "Germany"),
    (0x400000, 0x43FFFF, "United Kingdom"),
    (0x440000, 0x447FFF, "Austria"),
    (0x448000, 0x44FFFF, "Belgium"),
    (0x450000, 0x457FFF, "Bulgaria"),
    (0x458000, 0x45FFFF, "Denmark"),
    (0x460000, 0x467FFF, "Finland"),
    (0x468000, 0x46FFFF, "Greece"),
    (0x470000, 0x477FFF, "Hungary"),
    (0x478000, 0x47FFFF, "Norway"),
    (0x480000, 0x487FFF, "Netherlands"),
    (0x488000, 0x48FFFF, "Poland"),
    (0x490000, 0x497FFF, "Portugal"),
    (0x498000, 0x49FFFF, "Czech Republic"),
    (0x4A0000, 0x4A7FFF, "Romania"),
    (0x4A8000, 0x4AFFFF, "Sweden"),
    (0x4B0000, 0x4B7FFF, "Switzerland"),
    (0x4B8000, 0x4BFFFF, "Turkey"),
    (0x4C8000, 0x4C83FF, "Cyprus"),
    (0x4CA000, 0x4CAFFF, "Ireland"),
    (0x4CC000, 0x4CCFFF, "Iceland"),
    (0x500000, 0x5003FF, "San Marino"),
    (0x501C00, 0x501FFF, "Malta"),
    (0x508000, 0x50FFFF, "Ukraine"),
    (0x600000, 0x6003FF, "Armenia"),
    (0x680000, 0x6803FF, "Mongolia"),
    (0x700000, 0x700FFF, "Afghanistan"),
    (0x702000, 0x702FFF, "Bangladesh"),
    (0x718000, 0x71FFFF, "South Korea"),
    (0x720000, 0x727FFF, "North Korea"),
    (0x730000, 0x737FFF, "Iran"),
    (0x738000, 0x73FFFF, "Israel"),
    (0x740000, 0x747FFF, "Jordan"),
    (0x750000, 0x757FFF, "Malaysia"),
    (0x758000, 0x75FFFF, "Philippines"),
    (0x760000, 0x767FFF, "Pakistan"),
    (0x768000, 0x76FFFF, "Singapore"),
    (0x770000, 0x777FFF, "Sri Lanka"),
    (0x780000, 0x7BFFFF, "China"),
    (0x7C0000, 0x7FFFFF, "Australia"),
    (0x800000, 0x83FFFF, "India"),
    (0x840000, 0x87FFFF, "Japan"),
    (0x880000, 0x887FFF, "Thailand"),
    (0x888000, 0x88FFFF, "Vietnam"),
    (0x8A0000, 0x8A7FFF, "Indonesia"),
    (0xA00000, 0xAFFFFF, "United States"),
    (0xC00000, 0xC3FFFF, "Canada"),
    (0xC80000, 0xC87FFF, "New Zealand"),
    (0xE00000, 0xE3FFFF, "Argentina"),
    (0xE40000, 0xE7FFFF, "Brazil"),
    (0xE80000, 0xE80FFF, "Chile"),
    (0xE84000, 0xE84FFF, "Ecuador"),
    (0xE90000, 0xE90FFF, "Paraguay"),
    (0xE94000, 0xE94FFF, "Uruguay"),
];

/// Resolve a station id (6-char hex string) to its allocating country.
///
/// TIS-B/synthetic ids (`~` prefix) and malformed ids resolve to `None`.
pub fn lookup_country(id: &str) -> Option<&'static str> {
    let id = id.trim();
    if id.len() != 6 {
        return None;
    }
    let addr = u32::from_str_radix(id, 16).ok()?;

    COUNTRY_BLOCKS
        .iter()
        .find(|(start, end, _)| (*start..=*end).contains(&addr))
        .map(|(_, _, name)| *name)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
