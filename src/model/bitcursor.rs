//! A read cursor over a byte buffer that is addressable down to single
//! bits. Multi-bit reads are most-significant-bit first: bit 0 of a byte is
//! its high bit. Byte order only matters for the wide integer reads, and is
//! chosen per call.

use byteorder::ByteOrder;

use crate::model::addr;

/// Returned when a read wants more bits than are left in the buffer.
/// Near the end of a page this is expected and must be handled by the
/// caller, usually by omitting whatever was being decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Underrun {
    pub requested: u64,
    pub remaining: u64,
}

impl std::fmt::Display for Underrun {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Requested {} bits but only {} remain", self.requested, self.remaining)
    }
}

impl std::error::Error for Underrun {
}

#[derive(Debug, Clone)]
pub struct BitCursor<T> {
    inner: T,
    /* bits from the start of the buffer */
    pos: u64,
}

impl<T: AsRef<[u8]>> BitCursor<T> {
    pub fn new(inner: T) -> Self {
        BitCursor {
            inner,
            pos: 0,
        }
    }

    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Size of the buffer, in bits.
    pub fn limit(&self) -> u64 {
        self.inner.as_ref().len() as u64 * 8
    }

    pub fn remaining(&self) -> u64 {
        self.limit() - self.pos
    }

    pub fn has_remaining(&self) -> bool {
        self.remaining() > 0
    }

    pub fn address(&self) -> addr::Address {
        addr::Address::new(self.pos / 8, (self.pos % 8) as u8)
    }

    /// Moves the read point to bit `shift` of byte `index`. Positioning
    /// exactly at the end of the buffer is allowed.
    pub fn position(&mut self, index: usize, shift: u8) -> Result<(), Underrun> {
        let target = index as u64 * 8 + shift as u64;

        if target > self.limit() {
            return Err(Underrun { requested: target, remaining: self.limit() });
        }

        self.pos = target;
        Ok(())
    }

    fn check(&self, bits: u64) -> Result<(), Underrun> {
        if bits > self.remaining() {
            Err(Underrun { requested: bits, remaining: self.remaining() })
        } else {
            Ok(())
        }
    }

    /// Reads eight bits at the current alignment. With a non-zero shift the
    /// result is made of the low bits of one byte followed by the high bits
    /// of the next.
    pub fn get(&mut self) -> Result<u8, Underrun> {
        self.check(8)?;

        let data = self.inner.as_ref();
        let index = (self.pos / 8) as usize;
        let shift = (self.pos % 8) as u32;

        let byte = match shift {
            0 => data[index],
            s => (data[index] << s) | (data[index + 1] >> (8 - s)),
        };

        self.pos+= 8;
        Ok(byte)
    }

    /// Reads `n` bits (at most 64) into the low end of the result, first bit
    /// read ending up most significant.
    ///
    /// # Panics
    ///
    /// Panics if `n` is greater than 64.
    pub fn get_bits(&mut self, n: u32) -> Result<u64, Underrun> {
        assert!(n <= 64, "cannot read more than 64 bits at once");
        self.check(n as u64)?;

        let data = self.inner.as_ref();
        let mut acc: u64 = 0;
        let mut left = n;

        while left > 0 {
            let index = (self.pos / 8) as usize;
            let shift = (self.pos % 8) as u32;
            let take = std::cmp::min(8 - shift, left);

            let chunk = (data[index] as u64 >> (8 - shift - take)) & ((1u64 << take) - 1);
            acc = (acc << take) | chunk;

            self.pos+= take as u64;
            left-= take;
        }

        Ok(acc)
    }

    /// Fills `out` entirely, or fails without moving.
    pub fn get_into(&mut self, out: &mut [u8]) -> Result<(), Underrun> {
        self.check(out.len() as u64 * 8)?;

        for b in out.iter_mut() {
            *b = self.get()?;
        }

        Ok(())
    }

    /// Reads as many whole (shifted) bytes as are available, up to `max`.
    pub fn get_available(&mut self, max: usize) -> Vec<u8> {
        let count = std::cmp::min(max as u64, self.remaining() / 8) as usize;
        let mut out = vec![0; count];

        /* count was bounded by remaining(), so this cannot underrun */
        match self.get_into(&mut out) {
            Ok(()) => out,
            Err(_) => Vec::new(),
        }
    }

    pub fn get_u16<B: ByteOrder>(&mut self) -> Result<u16, Underrun> {
        let mut buf = [0; 2];
        self.get_into(&mut buf)?;
        Ok(B::read_u16(&buf))
    }

    pub fn get_u32<B: ByteOrder>(&mut self) -> Result<u32, Underrun> {
        let mut buf = [0; 4];
        self.get_into(&mut buf)?;
        Ok(B::read_u32(&buf))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use byteorder::{BigEndian, LittleEndian};
    use hex_literal::hex;
    use pretty_assertions::assert_eq;

    /// Packs bytes that were read at `shift` back into the source layout.
    /// The first `shift` bits of the source are not covered by the read and
    /// are taken from `head`.
    fn unshift(head: u8, read: &[u8], shift: u8) -> Vec<u8> {
        if shift == 0 {
            return read.to_vec();
        }

        let mut out = Vec::with_capacity(read.len() + 1);
        let mut carry = head & !(0xffu8 >> shift);

        for b in read {
            out.push(carry | (b >> shift));
            carry = b << (8 - shift);
        }
        out.push(carry);
        out
    }

    #[test]
    fn aligned_reads_reproduce_source() {
        let bytes = hex!("21 7b bb 73 00 00");
        let mut c = BitCursor::new(&bytes[..]);

        let mut read = vec![];
        while c.has_remaining() {
            read.push(c.get().unwrap());
        }

        assert_eq!(read, bytes.to_vec());
        assert_eq!(c.remaining(), 0);
    }

    #[test]
    fn shifted_reads_round_trip() {
        let bytes = hex!("21 7b bb 73 00 ff 5a");

        for shift in 0..8u8 {
            let mut c = BitCursor::new(&bytes[..]);
            c.position(0, shift).unwrap();

            let read = c.get_available(bytes.len());
            let expected_count = if shift == 0 { bytes.len() } else { bytes.len() - 1 };
            assert_eq!(read.len(), expected_count, "shift {}", shift);

            let rebuilt = unshift(bytes[0], &read, shift);
            /* the last partial byte is only partially covered by the read */
            let covered = if shift == 0 { bytes.len() } else { bytes.len() - 1 };
            assert_eq!(&rebuilt[..covered], &bytes[..covered], "shift {}", shift);
            if shift != 0 {
                let mask = !(0xffu8 >> shift);
                assert_eq!(rebuilt[covered] & mask, bytes[covered] & mask);
            }
        }
    }

    #[test]
    fn shifted_byte_combines_neighbours() {
        let bytes = hex!("21 7b");
        let mut c = BitCursor::new(&bytes[..]);
        c.position(0, 3).unwrap();

        /* 00100001 01111011 -> 00001|011 */
        assert_eq!(c.get(), Ok(0b0000_1011));
        assert_eq!(c.address(), addr::Address::new(1, 3));
    }

    #[test]
    fn get_bits_crosses_bytes() {
        let bytes = hex!("21 7b bb");
        let mut c = BitCursor::new(&bytes[..]);

        assert_eq!(c.get_bits(3), Ok(0b001));
        assert_eq!(c.get_bits(7), Ok(0b000_0101));
        assert_eq!(c.get_bits(14), Ok(0b11_1011_1011_1011));
        assert_eq!(c.remaining(), 0);
    }

    #[test]
    fn get_bits_full_width() {
        let bytes = hex!("01 23 45 67 89 ab cd ef ff");
        let mut c = BitCursor::new(&bytes[..]);
        c.position(0, 4).unwrap();

        assert_eq!(c.get_bits(64), Ok(0x1234_5678_9abc_deff));
        assert_eq!(c.get_bits(0), Ok(0));
    }

    #[test]
    #[should_panic(expected = "cannot read more than 64 bits at once")]
    fn get_bits_wider_than_u64() {
        let bytes = [0u8; 16];
        BitCursor::new(&bytes[..]).get_bits(65).ok();
    }

    #[test]
    fn underrun_at_end() {
        let bytes = hex!("ff 00");
        let mut c = BitCursor::new(&bytes[..]);
        c.position(1, 1).unwrap();

        assert_eq!(c.get(), Err(Underrun { requested: 8, remaining: 7 }));
        /* a failed read doesn't move the cursor */
        assert_eq!(c.remaining(), 7);
        assert_eq!(c.get_bits(7), Ok(0));
        assert!(!c.has_remaining());
    }

    #[test]
    fn position_past_end_fails() {
        let bytes = hex!("ff 00");
        let mut c = BitCursor::new(&bytes[..]);

        assert!(c.position(2, 0).is_ok());
        assert!(c.position(2, 1).is_err());
        assert_eq!(c.remaining(), 0);
        assert_eq!(c.limit(), 16);
    }

    #[test]
    fn explicit_byte_order() {
        let bytes = hex!("21 7b 00 80");
        let mut c = BitCursor::new(&bytes[..]);

        assert_eq!(c.get_u16::<LittleEndian>(), Ok(0x7b21));
        c.position(0, 0).unwrap();
        assert_eq!(c.get_u16::<BigEndian>(), Ok(0x217b));
        c.position(0, 0).unwrap();
        assert_eq!(c.get_u32::<LittleEndian>(), Ok(0x8000_7b21));
        assert_eq!(c.get_u16::<LittleEndian>(), Err(Underrun { requested: 16, remaining: 0 }));
    }
}
