use core::fmt::Debug;

/// Errors returned by the Sensirion sensor drivers.
///
/// `E` is the error type of the underlying I2C bus.
#[derive(Debug, thiserror::Error)]
pub enum SensorError<E: Debug> {
    /// The bus transfer failed.
    #[error("i2c bus error: {0:?}")]
    Bus(E),
    /// A data word did not match its CRC-8 checksum.
    #[error("checksum mismatch in sensor response")]
    Checksum,
}

#[cfg(test)]
mod tests {
    use super::SensorError;
    use embedded_hal::i2c::ErrorKind;

    #[test]
    fn display_names_the_failure() {
        let err: SensorError<ErrorKind> = SensorError::Checksum;
        assert_eq!(err.to_string(), "checksum mismatch in sensor response");
    }
}
