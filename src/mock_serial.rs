//! We use this mocking module in unit tests to emulate a serial port.

use thiserror::Error;

/// Our mock type used to emulate a serial port.
///
/// Reads are non-blocking: once the queued data runs out the port returns
/// [`MockSerialError::WouldBlock`], which is what a real port with a short
/// timeout looks like to the driver.
pub struct MockSerial {
    /// Everything the driver has written to the port.
    write_buffer: heapless::Vec<u8, 256>,
    /// Pre-queued bytes handed out by `read`.
    read_buffer: heapless::Vec<u8, 256>,
    read_position: usize,
    /// Simulate a hard read failure (device unplugged).
    should_error_on_read: bool,
}

#[derive(Error, Debug)]
pub enum MockSerialError {
    /// No data available right now.
    #[error("No data available")]
    WouldBlock,
    /// Queued data exceeds the mock buffer.
    #[error("Queued data exceeds the mock buffer")]
    Overflow,
    /// Simulated hard I/O failure.
    #[error("Simulated I/O failure")]
    Simulated,
}

impl embedded_io::Error for MockSerialError {
    fn kind(&self) -> embedded_io::ErrorKind {
        match self {
            MockSerialError::WouldBlock => embedded_io::ErrorKind::Other,
            MockSerialError::Overflow => embedded_io::ErrorKind::OutOfMemory,
            MockSerialError::Simulated => embedded_io::ErrorKind::BrokenPipe,
        }
    }
}

impl embedded_io::ErrorType for MockSerial {
    type Error = MockSerialError;
}

impl embedded_io::Write for MockSerial {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        self.write_buffer
            .extend_from_slice(buf)
            .map_err(|_| MockSerialError::Overflow)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

impl embedded_io::Read for MockSerial {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        if self.should_error_on_read {
            return Err(MockSerialError::Simulated);
        }
        if self.read_position >= self.read_buffer.len() {
            return Err(MockSerialError::WouldBlock);
        }

        let available = self.read_buffer.len() - self.read_position;
        let count = buf.len().min(available);
        buf[..count]
            .copy_from_slice(&self.read_buffer[self.read_position..self.read_position + count]);
        self.read_position += count;
        Ok(count)
    }
}

impl MockSerial {
    pub fn new() -> Self {
        Self {
            write_buffer: heapless::Vec::new(),
            read_buffer: heapless::Vec::new(),
            read_position: 0,
            should_error_on_read: false,
        }
    }

    /// Append bytes to be handed out by subsequent `read` calls.
    pub fn queue_read_data(&mut self, data: &[u8]) -> Result<(), MockSerialError> {
        self.read_buffer
            .extend_from_slice(data)
            .map_err(|_| MockSerialError::Overflow)
    }

    /// Everything written to the port so far.
    pub fn written_data(&self) -> &[u8] {
        &self.write_buffer
    }

    /// Make subsequent reads fail hard instead of would-blocking.
    pub fn set_read_error(&mut self, should_error: bool) {
        self.should_error_on_read = should_error;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_io::{Read, Write};

    #[test]
    fn writes_accumulate() {
        let mut mock = MockSerial::new();
        mock.write(b"<:").unwrap();
        mock.write(b":>").unwrap();
        assert_eq!(mock.written_data(), b"<::>");
    }

    #[test]
    fn reads_drain_queued_data_in_order() {
        let mut mock = MockSerial::new();
        mock.queue_read_data(b"hello world").unwrap();

        let mut buf = [0u8; 5];
        assert_eq!(mock.read(&mut buf).unwrap(), 5);
        assert_eq!(&buf, b"hello");
        assert_eq!(mock.read(&mut buf).unwrap(), 5);
        assert_eq!(&buf, b" worl");
    }

    #[test]
    fn exhausted_port_would_blocks() {
        let mut mock = MockSerial::new();
        mock.queue_read_data(b"xy").unwrap();

        let mut buf = [0u8; 8];
        assert_eq!(mock.read(&mut buf).unwrap(), 2);
        assert!(matches!(
            mock.read(&mut buf),
            Err(MockSerialError::WouldBlock)
        ));
    }

    #[test]
    fn queued_data_can_be_appended_between_reads() {
        let mut mock = MockSerial::new();
        mock.queue_read_data(b"ab").unwrap();

        let mut buf = [0u8; 8];
        assert_eq!(mock.read(&mut buf).unwrap(), 2);

        mock.queue_read_data(b"cd").unwrap();
        assert_eq!(mock.read(&mut buf).unwrap(), 2);
        assert_eq!(&buf[..2], b"cd");
    }

    #[test]
    fn error_type_satisfies_the_embedded_io_contract() {
        // embedded_io::Error requires the core error trait; keep the derive.
        fn assert_error<E: core::error::Error + embedded_io::Error>() {}
        assert_error::<MockSerialError>();
        assert_eq!(MockSerialError::WouldBlock.to_string(), "No data available");
    }

    #[test]
    fn simulated_read_failure() {
        let mut mock = MockSerial::new();
        mock.queue_read_data(b"data").unwrap();
        mock.set_read_error(true);

        let mut buf = [0u8; 4];
        assert!(matches!(
            mock.read(&mut buf),
            Err(MockSerialError::Simulated)
        ));
    }
}
