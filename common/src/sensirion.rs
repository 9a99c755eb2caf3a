//! Word framing shared by the Sensirion sensors.
//!
//! Commands are 16-bit big-endian. Every 16-bit data word, in either
//! direction, is followed by a CRC-8 (polynomial 0x31, init 0xFF).
//! Neither sensor supports repeated start, so a command write and the
//! response read are separate transfers with a wait in between.

use embedded_hal::i2c::I2c;
use sensirion_i2c::{crc8, i2c};

use crate::error::SensorError;

/// Most argument words any command takes.
const MAX_ARGS: usize = 3;

/// Most response words any command returns (32-byte ASCII strings).
const MAX_WORDS: usize = 16;

fn bus_error<I: I2c>(e: i2c::Error<I>) -> SensorError<I::Error> {
    match e {
        i2c::Error::I2cWrite(e) | i2c::Error::I2cRead(e) => SensorError::Bus(e),
        i2c::Error::Crc => SensorError::Checksum,
    }
}

/// Writes `command` followed by the CRC-framed `args`.
pub(crate) fn write_command<I: I2c>(
    i2c: &mut I,
    address: u8,
    command: u16,
    args: &[u16],
) -> Result<(), SensorError<I::Error>> {
    debug_assert!(args.len() <= MAX_ARGS);

    if args.is_empty() {
        return i2c::write_command_u16(i2c, address, command).map_err(SensorError::Bus);
    }

    let mut buf = [0u8; 2 + 3 * MAX_ARGS];
    buf[..2].copy_from_slice(&command.to_be_bytes());

    let mut len = 2;
    for word in args {
        let bytes = word.to_be_bytes();
        buf[len..len + 2].copy_from_slice(&bytes);
        buf[len + 2] = crc8::calculate(&bytes);
        len += 3;
    }

    i2c.write(address, &buf[..len]).map_err(SensorError::Bus)
}

/// Reads `words.len()` CRC-framed words.
pub(crate) fn read_words<I: I2c>(
    i2c: &mut I,
    address: u8,
    words: &mut [u16],
) -> Result<(), SensorError<I::Error>> {
    debug_assert!(words.len() <= MAX_WORDS);

    let mut buf = [0u8; 3 * MAX_WORDS];
    let buf = &mut buf[..3 * words.len()];
    i2c::read_words_with_crc(i2c, address, buf).map_err(bus_error)?;

    for (word, chunk) in words.iter_mut().zip(buf.chunks_exact(3)) {
        *word = u16::from_be_bytes([chunk[0], chunk[1]]);
    }

    Ok(())
}

/// Turns words holding a NUL-terminated ASCII string into a `String`.
pub(crate) fn words_to_string(words: &[u16]) -> String {
    words
        .iter()
        .flat_map(|w| w.to_be_bytes())
        .take_while(|&b| b != 0)
        .map(char::from)
        .collect()
}
