use std::io::{self, Write};

use super::{Order, Rans, LOWER_BOUND, SCALE, SCALE_BITS, STATE_COUNT};
use crate::io::writer::num::{write_itf8, write_u32_le, write_u8};

pub fn encode(order: Order, src: &[u8]) -> io::Result<Vec<u8>> {
    let mut rans = Rans::new();
    encode_with(&mut rans, order, src)
}

pub(super) fn encode_with(rans: &mut Rans, order: Order, src: &[u8]) -> io::Result<Vec<u8>> {
    // Order-1 needs at least one byte per state. Tiny inputs fall back to
    // order-0, as htslib does.
    let order = if src.len() < STATE_COUNT {
        Order::Zero
    } else {
        order
    };

    let payload = match order {
        Order::Zero => encode_order_0(rans, src)?,
        Order::One => encode_order_1(rans, src)?,
    };

    let mut dst = Vec::with_capacity(payload.len() + 9);
    write_u8(&mut dst, u8::from(order))?;

    let compressed_size =
        u32::try_from(payload.len()).map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
    let uncompressed_size =
        u32::try_from(src.len()).map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;

    write_u32_le(&mut dst, compressed_size)?;
    write_u32_le(&mut dst, uncompressed_size)?;

    dst.write_all(&payload)?;

    Ok(dst)
}

fn encode_order_0(rans: &mut Rans, src: &[u8]) -> io::Result<Vec<u8>> {
    if src.is_empty() {
        return Ok(Vec::new());
    }

    let row = &mut rans.frequencies[0];
    row.fill(0);

    for &b in src {
        row[usize::from(b)] += 1;
    }

    let frequencies = normalize_frequencies(row);
    let cumulative_frequencies = build_cumulative_frequencies(&frequencies);

    let mut dst = Vec::new();
    write_frequencies(&mut dst, &frequencies)?;

    // Symbols are pushed in reverse stream order and the buffer is reversed
    // at the end, mirroring the backwards buffer writes of the reference
    // implementation.
    let mut buf = Vec::new();
    let mut states = [LOWER_BOUND; STATE_COUNT];

    for i in (0..src.len()).rev() {
        let sym = usize::from(src[i]);

        put_symbol(
            &mut states[i % STATE_COUNT],
            &mut buf,
            frequencies[sym],
            cumulative_frequencies[sym],
        );
    }

    flush_states(&states, &mut buf);

    buf.reverse();
    dst.write_all(&buf)?;

    Ok(dst)
}

fn encode_order_1(rans: &mut Rans, src: &[u8]) -> io::Result<Vec<u8>> {
    let quarter = src.len() / STATE_COUNT;

    // Each state covers a contiguous quarter; the last state also covers the
    // remainder. The first byte of each segment is conditioned on context 0.
    let segment_starts = [0, quarter, 2 * quarter, 3 * quarter];

    let frequencies = &mut rans.frequencies;

    for row in frequencies.iter_mut() {
        row.fill(0);
    }

    for (j, &start) in segment_starts.iter().enumerate() {
        let end = if j == STATE_COUNT - 1 {
            src.len()
        } else {
            start + quarter
        };

        frequencies[0][usize::from(src[start])] += 1;

        for w in src[start..end].windows(2) {
            frequencies[usize::from(w[0])][usize::from(w[1])] += 1;
        }
    }

    let mut normalized = vec![[0u32; 256]; 256];
    let mut cumulative = vec![[0u32; 256]; 256];

    for (ctx, row) in frequencies.iter().enumerate() {
        if row.iter().all(|&f| f == 0) {
            continue;
        }

        normalized[ctx] = normalize_frequencies(row);
        cumulative[ctx] = build_cumulative_frequencies(&normalized[ctx]);
    }

    let mut dst = Vec::new();
    write_frequencies_1(&mut dst, &normalized)?;

    let mut buf = Vec::new();
    let mut states = [LOWER_BOUND; STATE_COUNT];

    // cursors start at the second-to-last byte of each segment; the pending
    // symbol is the byte after the cursor
    let mut cursors = [
        quarter as isize - 2,
        2 * quarter as isize - 2,
        3 * quarter as isize - 2,
        src.len() as isize - 2,
    ];

    let mut last = [
        src[(cursors[0] + 1) as usize],
        src[(cursors[1] + 1) as usize],
        src[(cursors[2] + 1) as usize],
        src[(cursors[3] + 1) as usize],
    ];

    // the remainder beyond 4 * quarter is carried by the last state
    while cursors[3] > 4 * quarter as isize - 2 {
        let ctx = usize::from(src[cursors[3] as usize]);
        let sym = usize::from(last[3]);

        put_symbol(
            &mut states[3],
            &mut buf,
            normalized[ctx][sym],
            cumulative[ctx][sym],
        );

        last[3] = src[cursors[3] as usize];
        cursors[3] -= 1;
    }

    while cursors[0] >= 0 {
        for j in (0..STATE_COUNT).rev() {
            let ctx = usize::from(src[cursors[j] as usize]);
            let sym = usize::from(last[j]);

            put_symbol(
                &mut states[j],
                &mut buf,
                normalized[ctx][sym],
                cumulative[ctx][sym],
            );

            last[j] = src[cursors[j] as usize];
        }

        for cursor in &mut cursors {
            *cursor -= 1;
        }
    }

    // first byte of each segment, conditioned on context 0
    for j in (0..STATE_COUNT).rev() {
        let sym = usize::from(last[j]);

        put_symbol(
            &mut states[j],
            &mut buf,
            normalized[0][sym],
            cumulative[0][sym],
        );
    }

    flush_states(&states, &mut buf);

    buf.reverse();
    dst.write_all(&buf)?;

    Ok(dst)
}

fn put_symbol(state: &mut u32, buf: &mut Vec<u8>, frequency: u32, cumulative_frequency: u32) {
    debug_assert!(frequency > 0, "symbol encoded with zero frequency");

    let x_max = ((LOWER_BOUND >> SCALE_BITS) << 8) * frequency;
    let mut x = *state;

    while x >= x_max {
        buf.push((x & 0xff) as u8);
        x >>= 8;
    }

    *state = ((x / frequency) << SCALE_BITS) + (x % frequency) + cumulative_frequency;
}

fn flush_states(states: &[u32; STATE_COUNT], buf: &mut Vec<u8>) {
    for state in states.iter().rev() {
        buf.push((state >> 24) as u8);
        buf.push((state >> 16) as u8);
        buf.push((state >> 8) as u8);
        buf.push(*state as u8);
    }
}

pub(super) fn normalize_frequencies(frequencies: &[u32; 256]) -> [u32; 256] {
    let total: u64 = frequencies.iter().map(|&f| u64::from(f)).sum();
    let mut normalized = [0u32; 256];

    if total == 0 {
        return normalized;
    }

    let mut normalized_total = 0u32;

    for (sym, &f) in frequencies.iter().enumerate() {
        if f == 0 {
            continue;
        }

        let mut n = ((u64::from(f) * u64::from(SCALE)) / total) as u32;

        if n == 0 {
            n = 1;
        }

        normalized[sym] = n;
        normalized_total += n;
    }

    // Nudge the total to exactly SCALE, spending the difference on the most
    // frequent symbols so no frequency drops to 0.
    while normalized_total != SCALE {
        let adjustment: i64 = if normalized_total < SCALE { 1 } else { -1 };

        let sym = (0..256)
            .filter(|&i| normalized[i] > 1 || adjustment > 0 && normalized[i] > 0)
            .max_by_key(|&i| normalized[i])
            .expect("at least one symbol has a normalized frequency");

        normalized[sym] = (i64::from(normalized[sym]) + adjustment) as u32;
        normalized_total = (i64::from(normalized_total) + adjustment) as u32;
    }

    normalized
}

pub(super) fn build_cumulative_frequencies(frequencies: &[u32; 256]) -> [u32; 256] {
    let mut cumulative_frequencies = [0; 256];

    for i in 1..frequencies.len() {
        cumulative_frequencies[i] = cumulative_frequencies[i - 1] + frequencies[i - 1];
    }

    cumulative_frequencies
}

/// Writes an order-0 frequency table: run-length-encoded symbols with ITF8
/// frequencies, terminated by a zero symbol byte.
fn write_frequencies<W>(writer: &mut W, frequencies: &[u32; 256]) -> io::Result<()>
where
    W: Write,
{
    let mut rle = 0;

    for (sym, &f) in frequencies.iter().enumerate() {
        if f == 0 {
            continue;
        }

        if rle > 0 {
            rle -= 1;
        } else {
            write_u8(writer, sym as u8)?;

            if sym > 0 && frequencies[sym - 1] > 0 {
                // start of a run: count the consecutive nonzero symbols that
                // follow
                rle = frequencies[sym + 1..]
                    .iter()
                    .take_while(|&&g| g > 0)
                    .count();

                write_u8(writer, rle as u8)?;
            }
        }

        write_itf8(writer, f as i32)?;
    }

    write_u8(writer, 0x00)?;

    Ok(())
}

fn write_frequencies_1<W>(writer: &mut W, frequencies: &[[u32; 256]]) -> io::Result<()>
where
    W: Write,
{
    let mut rle = 0;

    for ctx in 0..256 {
        if frequencies[ctx].iter().all(|&f| f == 0) {
            continue;
        }

        if rle > 0 {
            rle -= 1;
        } else {
            write_u8(writer, ctx as u8)?;

            if ctx > 0 && frequencies[ctx - 1].iter().any(|&f| f > 0) {
                rle = frequencies[ctx + 1..]
                    .iter()
                    .take_while(|row| row.iter().any(|&f| f > 0))
                    .count();

                write_u8(writer, rle as u8)?;
            }
        }

        write_frequencies(writer, &frequencies[ctx])?;
    }

    write_u8(writer, 0x00)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_frequencies() {
        let mut frequencies = [0u32; 256];
        frequencies[usize::from(b'a')] = 64;
        frequencies[usize::from(b'b')] = 16;
        frequencies[usize::from(b'c')] = 16;
        frequencies[usize::from(b'd')] = 32;

        let normalized = normalize_frequencies(&frequencies);

        assert_eq!(normalized.iter().sum::<u32>(), SCALE);
        assert_eq!(normalized[usize::from(b'a')], 2048);
        assert_eq!(normalized[usize::from(b'b')], 512);
        assert_eq!(normalized[usize::from(b'c')], 512);
        assert_eq!(normalized[usize::from(b'd')], 1024);
    }

    #[test]
    fn test_normalize_frequencies_keeps_rare_symbols() {
        let mut frequencies = [0u32; 256];
        frequencies[0] = 1_000_000;
        frequencies[1] = 1;

        let normalized = normalize_frequencies(&frequencies);

        assert_eq!(normalized.iter().sum::<u32>(), SCALE);
        assert!(normalized[1] >= 1);
    }

    #[test]
    fn test_normalize_frequencies_with_empty_input() {
        let frequencies = [0u32; 256];
        let normalized = normalize_frequencies(&frequencies);
        assert!(normalized.iter().all(|&f| f == 0));
    }
}
