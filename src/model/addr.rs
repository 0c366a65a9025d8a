use std::str::FromStr;

/// A position in a byte source with single-bit granularity. `bit` counts
/// from the most significant bit of `byte` and is always in `0..8`.
#[derive(Default, PartialEq, Eq, PartialOrd, Ord, Hash, Copy, Clone)]
pub struct Address {
    byte: u64,
    bit: u8,
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub enum AddressParseError {
    EmptyString,
    MalformedBytes(std::num::ParseIntError),
    MalformedBits(std::num::ParseIntError),
    TooManyBits,
}

impl Address {
    pub const ZERO: Self = Self { byte: 0, bit: 0 };

    /// Builds an address, rolling any whole bytes in `bit` into `byte`.
    pub fn new(byte: u64, bit: u8) -> Self {
        Self::normalize_unsigned(byte, bit as u64).unwrap_or(Self { byte: u64::MAX, bit: 7 })
    }

    pub fn bytes(&self) -> u64 {
        self.byte
    }

    pub fn bits(&self) -> u8 {
        self.bit
    }

    /// Linear offset in bits. Exact for the whole address range.
    pub fn as_bits(&self) -> u128 {
        self.byte as u128 * 8 + self.bit as u128
    }

    pub fn from_bits(bits: u128) -> Option<Self> {
        Some(Self {
            byte: u64::try_from(bits / 8).ok()?,
            bit: (bits % 8) as u8,
        })
    }

    fn normalize_unsigned(bytes: u64, bits: u64) -> Option<Self> {
        Some(Self {
            byte: bytes.checked_add(bits / 8)?,
            bit: (bits % 8) as u8,
        })
    }

    /// Moves the address by a signed number of bits. Returns None if the
    /// result would fall below zero or past the end of the address space.
    pub fn checked_offset_bits(self, delta: i64) -> Option<Self> {
        Self::from_bits(self.as_bits().checked_add_signed(delta as i128)?)
    }

    /// Parses a string of the form "\[0x\]1234\[.5\]" into an
    /// address. A bit offset can optionally be specified. If
    /// unspecified, it is assumed to be zero.
    pub fn parse(string: &str, assume_hex: bool) -> Result<Self, AddressParseError> {
        let mut i = string.trim().splitn(2, '.');

        let mut radix = if assume_hex { 16 } else { 10 };

        let mut byte_portion = i.next().filter(|s| !s.is_empty()).ok_or(AddressParseError::EmptyString)?;

        if let Some(bp) = byte_portion.strip_prefix("0x") {
            radix = 16;
            byte_portion = bp;
        }

        let byte = u64::from_str_radix(byte_portion, radix).map_err(AddressParseError::MalformedBytes)?;

        let bit = match i.next() {
            Some(bit_fragment) => u8::from_str(bit_fragment).map_err(AddressParseError::MalformedBits)?,
            None => 0
        };

        if bit >= 8 {
            return Err(AddressParseError::TooManyBits);
        }

        Ok(Self { byte, bit })
    }
}

impl From<u64> for Address {
    fn from(byte: u64) -> Self {
        Self { byte, bit: 0 }
    }
}

impl FromStr for Address {
    type Err = AddressParseError;

    fn from_str(s: &str) -> Result<Self, AddressParseError> {
        Self::parse(s, false)
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.bit {
            0 => write!(f, "{:#x}", self.byte),
            _ => write!(f, "{:#x}.{}", self.byte, self.bit)
        }
    }
}

impl std::fmt::Debug for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.bit {
            0 => write!(f, "addr({:#x})", self.byte),
            _ => write!(f, "addr({:#x}.{})", self.byte, self.bit)
        }
    }
}

impl std::fmt::Display for AddressParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AddressParseError::EmptyString => write!(f, "Address is empty"),
            AddressParseError::MalformedBytes(e) => write!(f, "Malformed byte offset: {}", e),
            AddressParseError::MalformedBits(e) => write!(f, "Malformed bit offset: {}", e),
            AddressParseError::TooManyBits => write!(f, "Bit offset must be less than 8"),
        }
    }
}

impl std::error::Error for AddressParseError {
}
