use std::io::{self, Read};

use super::{Order, LOWER_BOUND, SCALE, SCALE_BITS, STATE_COUNT};
use crate::io::reader::num::{read_itf8, read_u32_le, read_u8};

struct Model {
    frequencies: [u32; 256],
    cumulative_frequencies: [u32; 256],
    // slot (0..SCALE) -> symbol
    lookup: Vec<u8>,
}

impl Model {
    fn from_frequencies(frequencies: [u32; 256]) -> io::Result<Self> {
        let mut cumulative_frequencies = [0u32; 256];

        for i in 1..256 {
            cumulative_frequencies[i] = cumulative_frequencies[i - 1] + frequencies[i - 1];
        }

        let mut lookup = vec![0; SCALE as usize];

        for sym in 0..256 {
            let start = cumulative_frequencies[sym] as usize;
            let end = start + frequencies[sym] as usize;

            if end > lookup.len() {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    "invalid rANS frequency table: total exceeds scale",
                ));
            }

            lookup[start..end].fill(sym as u8);
        }

        Ok(Self {
            frequencies,
            cumulative_frequencies,
            lookup,
        })
    }

    fn advance(&self, state: u32) -> (u8, u32) {
        let slot = state & (SCALE - 1);
        let sym = self.lookup[slot as usize];
        let i = usize::from(sym);

        let next = self.frequencies[i] * (state >> SCALE_BITS) + slot
            - self.cumulative_frequencies[i];

        (sym, next)
    }
}

pub fn decode<R>(reader: &mut R) -> io::Result<Vec<u8>>
where
    R: Read,
{
    let order = read_u8(reader).and_then(Order::try_from)?;

    let compressed_size = read_u32_le(reader).map(|n| n as usize)?;
    let uncompressed_size = read_u32_le(reader).map(|n| n as usize)?;

    let mut src = vec![0; compressed_size];
    reader.read_exact(&mut src)?;

    if uncompressed_size == 0 {
        return Ok(Vec::new());
    }

    let mut dst = vec![0; uncompressed_size];

    match order {
        Order::Zero => decode_order_0(&mut &src[..], &mut dst)?,
        Order::One => decode_order_1(&mut &src[..], &mut dst)?,
    }

    Ok(dst)
}

fn decode_order_0(src: &mut &[u8], dst: &mut [u8]) -> io::Result<()> {
    let model = read_frequencies_0(src).and_then(Model::from_frequencies)?;

    let mut states = [0u32; STATE_COUNT];

    for state in &mut states {
        *state = read_u32_le(src)?;
    }

    let mut i = 0;

    while i < dst.len() {
        for state in &mut states {
            if i >= dst.len() {
                break;
            }

            let (sym, next) = model.advance(*state);
            dst[i] = sym;
            *state = renormalize(next, src)?;

            i += 1;
        }
    }

    Ok(())
}

fn decode_order_1(src: &mut &[u8], dst: &mut [u8]) -> io::Result<()> {
    let models = read_frequencies_1(src)?;

    let model = |ctx: usize| -> io::Result<&Model> {
        models[ctx].as_ref().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("missing rANS context: {ctx}"),
            )
        })
    };

    let mut states = [0u32; STATE_COUNT];

    for state in &mut states {
        *state = read_u32_le(src)?;
    }

    let quarter = dst.len() / STATE_COUNT;
    let mut contexts = [0usize; STATE_COUNT];

    for i in 0..quarter {
        for j in 0..STATE_COUNT {
            let (sym, next) = model(contexts[j])?.advance(states[j]);
            dst[i + j * quarter] = sym;
            states[j] = renormalize(next, src)?;
            contexts[j] = usize::from(sym);
        }
    }

    // the remainder is carried by the last state
    for i in STATE_COUNT * quarter..dst.len() {
        let j = STATE_COUNT - 1;
        let (sym, next) = model(contexts[j])?.advance(states[j]);
        dst[i] = sym;
        states[j] = renormalize(next, src)?;
        contexts[j] = usize::from(sym);
    }

    Ok(())
}

fn renormalize(mut state: u32, src: &mut &[u8]) -> io::Result<u32> {
    while state < LOWER_BOUND {
        let b = read_u8(src).map(u32::from)?;
        state = (state << 8) | b;
    }

    Ok(state)
}

/// Reads an order-0 frequency table: run-length-encoded symbols with ITF8
/// frequencies, terminated by a zero symbol byte.
fn read_frequencies_0(src: &mut &[u8]) -> io::Result<[u32; 256]> {
    let mut frequencies = [0u32; 256];

    let mut sym = read_u8(src).map(usize::from)?;
    let mut rle = 0;

    loop {
        let f = read_itf8(src)?;

        let f = u32::try_from(f).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        frequencies[sym] = f;

        if rle > 0 {
            rle -= 1;
            sym += 1;
        } else if src.first().copied().map(usize::from) == Some(sym + 1) {
            sym = read_u8(src).map(usize::from)?;
            rle = read_u8(src).map(usize::from)?;
        } else {
            sym = read_u8(src).map(usize::from)?;

            if sym == 0 {
                break;
            }
        }
    }

    Ok(frequencies)
}

fn read_frequencies_1(src: &mut &[u8]) -> io::Result<Vec<Option<Model>>> {
    let mut models: Vec<Option<Model>> = Vec::with_capacity(256);
    models.resize_with(256, || None);

    let mut ctx = read_u8(src).map(usize::from)?;
    let mut rle = 0;

    loop {
        let frequencies = read_frequencies_0(src)?;
        models[ctx] = Some(Model::from_frequencies(frequencies)?);

        if rle > 0 {
            rle -= 1;
            ctx += 1;
        } else if src.first().copied().map(usize::from) == Some(ctx + 1) {
            ctx = read_u8(src).map(usize::from)?;
            rle = read_u8(src).map(usize::from)?;
        } else {
            ctx = read_u8(src).map(usize::from)?;

            if ctx == 0 {
                break;
            }
        }
    }

    Ok(models)
}
