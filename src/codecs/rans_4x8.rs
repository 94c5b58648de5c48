//! rANS 4x8: the CRAM 3.0 asymmetric numeral system coder.
//!
//! Four interleaved rANS states over an 8-bit alphabet, with 12-bit
//! normalized frequencies. Order-0 models symbols independently; order-1
//! conditions each symbol on its predecessor, splitting the input into four
//! contiguous quarters, one per state.

mod decode;
mod encode;

pub(crate) use self::{decode::decode, encode::encode};

use std::io;

pub(crate) const STATE_COUNT: usize = 4;

// renormalization lower bound
pub(crate) const LOWER_BOUND: u32 = 0x80_0000;

// frequencies are normalized to sum to 1 << SCALE_BITS
pub(crate) const SCALE_BITS: u32 = 12;
pub(crate) const SCALE: u32 = 1 << SCALE_BITS;

/// The rANS 4x8 context order.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Order {
    /// Order-0: symbols are modeled independently.
    #[default]
    Zero,
    /// Order-1: symbols are conditioned on the preceding byte.
    One,
}

impl TryFrom<u8> for Order {
    type Error = io::Error;

    fn try_from(b: u8) -> Result<Self, Self::Error> {
        match b {
            0 => Ok(Self::Zero),
            1 => Ok(Self::One),
            _ => Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("invalid rANS order: {b}"),
            )),
        }
    }
}

impl From<Order> for u8 {
    fn from(order: Order) -> Self {
        match order {
            Order::Zero => 0,
            Order::One => 1,
        }
    }
}

/// A reusable rANS engine.
///
/// The order-1 frequency table is 256 KiB; sharing one engine across the
/// order-0 and order-1 compressors of a stream avoids reallocating it per
/// block. Engines are not reentrant.
pub struct Rans {
    pub(crate) frequencies: Box<[[u32; 256]; 256]>,
}

impl Rans {
    pub(crate) fn new() -> Self {
        Self {
            frequencies: vec![[0; 256]; 256]
                .into_boxed_slice()
                .try_into()
                .unwrap_or_else(|_| unreachable!()),
        }
    }

    pub(crate) fn compress(&mut self, order: Order, src: &[u8]) -> io::Result<Vec<u8>> {
        encode::encode_with(self, order, src)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_conversions() -> io::Result<()> {
        assert_eq!(Order::try_from(0)?, Order::Zero);
        assert_eq!(Order::try_from(1)?, Order::One);
        assert!(Order::try_from(2).is_err());

        assert_eq!(u8::from(Order::Zero), 0);
        assert_eq!(u8::from(Order::One), 1);

        Ok(())
    }

    #[test]
    fn test_round_trip_order_0() -> io::Result<()> {
        let data = b"ACGTACGTACGTACGTACGTACGTACGT";
        let compressed = encode(Order::Zero, data)?;
        let decompressed = decode(&mut &compressed[..])?;
        assert_eq!(decompressed, data);
        Ok(())
    }

    #[test]
    fn test_round_trip_order_1() -> io::Result<()> {
        let data = b"TTAGGCATTAGGCATTAGGCATTAGGCA";
        let compressed = encode(Order::One, data)?;
        let decompressed = decode(&mut &compressed[..])?;
        assert_eq!(decompressed, data);
        Ok(())
    }

    #[test]
    fn test_round_trip_single_symbol() -> io::Result<()> {
        let data = vec![b'A'; 4096];

        for order in [Order::Zero, Order::One] {
            let compressed = encode(order, &data)?;
            let decompressed = decode(&mut &compressed[..])?;
            assert_eq!(decompressed, data);
        }

        Ok(())
    }

    #[test]
    fn test_round_trip_short_inputs() -> io::Result<()> {
        for len in 0..16 {
            let data: Vec<u8> = (0..len).map(|i| (i * 37) as u8).collect();

            for order in [Order::Zero, Order::One] {
                let compressed = encode(order, &data)?;
                let decompressed = decode(&mut &compressed[..])?;
                assert_eq!(decompressed, data, "len = {len}");
            }
        }

        Ok(())
    }

    #[test]
    fn test_round_trip_all_bytes() -> io::Result<()> {
        let data: Vec<u8> = (0..=255).cycle().take(4000).collect();

        for order in [Order::Zero, Order::One] {
            let compressed = encode(order, &data)?;
            let decompressed = decode(&mut &compressed[..])?;
            assert_eq!(decompressed, data);
        }

        Ok(())
    }
}
