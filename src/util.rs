use itertools::Itertools;

pub fn nybble_to_hex(nyb: u8) -> char {
    (if nyb < 10 {
        b'0' + nyb
    } else {
        b'A' + (nyb - 10)
    }) as char
}

pub fn byte_to_hex(b: u8) -> [char; 2] {
    [nybble_to_hex(b >> 4), nybble_to_hex(b & 0xf)]
}

/// Space-separated uppercase hex, two digits per byte.
pub fn fmt_hex_slice(bytes: &[u8]) -> String {
    bytes.iter().map(|b| byte_to_hex(*b).iter().collect::<String>()).join(" ")
}

/// Eight-character zero-padded binary representation.
pub fn binary_dump(b: u8) -> String {
    format!("{:08b}", b)
}

/// Character shown for a byte in the text column. Whitespace and control
/// characters are shown as '.'.
pub fn display_char(b: u8) -> char {
    let c = b as char;
    if c.is_whitespace() || c.is_control() {
        '.'
    } else {
        c
    }
}

pub fn fmt_address(addr: u64) -> String {
    format!("{:08X}", addr)
}

#[cfg(test)]
pub fn temp_path(name: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!("hexlane-{}-{}", std::process::id(), name))
}
