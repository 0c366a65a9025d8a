//! Numeric interpretations of the bytes under the caret.
//!
//! Up to four bytes are taken once, at the caret's bit lane, and every
//! panel is a reinterpretation of that same working slice. Widths that
//! don't fit in what is left of the page are left out.

use byteorder::{BigEndian, ByteOrder, LittleEndian};

use crate::model::bitcursor;
use crate::util;

pub const WORKING_SIZE: usize = 4;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Panels {
    /// The working slice, one to four bytes (empty if nothing is under the caret).
    pub bytes: Vec<u8>,

    pub u8: Option<u8>,
    pub i8: Option<i8>,

    pub u16_le: Option<u16>,
    pub i16_le: Option<i16>,
    pub u16_be: Option<u16>,
    pub i16_be: Option<i16>,

    pub u32_le: Option<u32>,
    pub i32_le: Option<i32>,
    pub u32_be: Option<u32>,
    pub i32_be: Option<i32>,
}

fn decode16<B: ByteOrder>(bytes: &[u8]) -> (Option<u16>, Option<i16>) {
    match bytes.get(..2) {
        Some(b) => (Some(B::read_u16(b)), Some(B::read_i16(b))),
        None => (None, None),
    }
}

fn decode32<B: ByteOrder>(bytes: &[u8]) -> (Option<u32>, Option<i32>) {
    match bytes.get(..4) {
        Some(b) => (Some(B::read_u32(b)), Some(B::read_i32(b))),
        None => (None, None),
    }
}

impl Panels {
    pub fn decode(bytes: &[u8]) -> Panels {
        let bytes = &bytes[..std::cmp::min(bytes.len(), WORKING_SIZE)];

        let (u16_le, i16_le) = decode16::<LittleEndian>(bytes);
        let (u16_be, i16_be) = decode16::<BigEndian>(bytes);
        let (u32_le, i32_le) = decode32::<LittleEndian>(bytes);
        let (u32_be, i32_be) = decode32::<BigEndian>(bytes);

        Panels {
            bytes: bytes.to_vec(),

            u8: bytes.first().copied(),
            i8: bytes.first().map(|b| *b as i8),

            u16_le, i16_le, u16_be, i16_be,
            u32_le, i32_le, u32_be, i32_be,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// One zero-padded eight-digit binary string per available byte.
    pub fn binary(&self) -> Vec<String> {
        self.bytes.iter().copied().map(util::binary_dump).collect()
    }
}

/// Decodes the bytes at byte `index`, bit `lane` of the cursor's buffer.
/// The cursor is left where it was found.
pub fn inspect<T: AsRef<[u8]>>(cursor: &mut bitcursor::BitCursor<T>, index: usize, lane: u8) -> Panels {
    let saved = cursor.address();

    let panels = match cursor.position(index, lane) {
        Ok(()) => Panels::decode(&cursor.get_available(WORKING_SIZE)),
        Err(underrun) => {
            tracing::trace!(%underrun, index, lane, "nothing to inspect");
            Panels::default()
        },
    };

    /* the saved position was valid before, so restoring it can't fail */
    let _ = cursor.position(saved.bytes() as usize, saved.bits());

    panels
}

#[cfg(test)]
mod tests {
    use super::*;

    use hex_literal::hex;
    use pretty_assertions::assert_eq;

    #[test]
    fn sixteen_bit_orders() {
        let p = Panels::decode(&hex!("21 7b"));

        assert_eq!(p.u16_le, Some(0x7b21));
        assert_eq!(p.u16_le, Some(31521));
        assert_eq!(p.u16_be, Some(0x217b));
        assert_eq!(p.u16_be, Some(8571));
        assert_eq!(p.u32_le, None);
        assert_eq!(p.binary(), vec!["00100001", "01111011"]);
    }

    #[test]
    fn signedness() {
        let p = Panels::decode(&hex!("ff"));

        assert_eq!(p.u8, Some(255));
        assert_eq!(p.i8, Some(-1));
        assert_eq!(p.u16_le, None);
        assert_eq!(p.i16_be, None);
    }

    #[test]
    fn full_working_slice() {
        let p = Panels::decode(&hex!("00 00 00 80 ff"));

        assert_eq!(p.bytes, hex!("00 00 00 80").to_vec());
        assert_eq!(p.u32_le, Some(0x8000_0000));
        assert_eq!(p.i32_le, Some(i32::MIN));
        assert_eq!(p.u32_be, Some(0x80));
        assert_eq!(p.i32_be, Some(0x80));
        assert_eq!(p.i16_le, Some(0));
        assert_eq!(p.binary().len(), 4);
    }

    #[test]
    fn three_bytes_omit_32_bit() {
        let p = Panels::decode(&hex!("fe ff 01"));

        assert_eq!(p.i16_le, Some(-2));
        assert_eq!(p.i16_be, Some(-257));
        assert_eq!(p.u32_le, None);
        assert_eq!(p.i32_be, None);
        assert_eq!(p.binary().len(), 3);
    }

    #[test]
    fn inspect_at_lane() {
        let bytes = hex!("21 7b bb 73 00");
        let mut cursor = bitcursor::BitCursor::new(&bytes[..]);
        cursor.position(2, 0).unwrap();

        let p = inspect(&mut cursor, 0, 4);
        /* 0x21 0x7b 0xbb 0x73 0x00 shifted left by four bits */
        assert_eq!(p.bytes, hex!("17 bb b7 30").to_vec());
        assert_eq!(p.u8, Some(0x17));
        assert_eq!(cursor.address().bytes(), 2);

        let tail = inspect(&mut cursor, 4, 0);
        assert_eq!(tail.bytes, vec![0x00]);
        assert_eq!(tail.u16_le, None);

        /* nothing whole is left at the last byte once shifted */
        assert!(inspect(&mut cursor, 4, 1).is_empty());
        assert!(inspect(&mut cursor, 9, 0).is_empty());
    }
}
