use std::env;
use std::time::Instant;

use inquire::Select;
use serialport::SerialPort;
use trisense::command::ConfigCommand;
use trisense::device::TriSense;
use trisense::reading::{Channel, Method, Timestamp};

// Configuration constants - adjust these for your setup
const BAUD_RATE: u32 = 115200;
const SERIAL_TIMEOUT_MS: u64 = 50;
const POLL_INTERVAL_MS: u64 = 50;
const SETPOINT_CHANNEL: Channel = Channel::Ch1;
const SETPOINT_METHOD: Method = Method::Current;
const SETPOINT_VALUE: f64 = 100.0; // raw device units

pub struct PortWrapper(Box<dyn SerialPort>);

#[derive(Debug)]
pub struct IoError(std::io::Error);

impl core::fmt::Display for IoError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for IoError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.0)
    }
}

impl embedded_io::Error for IoError {
    fn kind(&self) -> embedded_io::ErrorKind {
        match self.0.kind() {
            std::io::ErrorKind::NotFound => embedded_io::ErrorKind::NotFound,
            std::io::ErrorKind::PermissionDenied => embedded_io::ErrorKind::PermissionDenied,
            std::io::ErrorKind::BrokenPipe => embedded_io::ErrorKind::BrokenPipe,
            std::io::ErrorKind::InvalidData => embedded_io::ErrorKind::InvalidData,
            std::io::ErrorKind::TimedOut => embedded_io::ErrorKind::TimedOut,
            std::io::ErrorKind::Interrupted => embedded_io::ErrorKind::Interrupted,
            _ => embedded_io::ErrorKind::Other,
        }
    }
}

impl embedded_io::ErrorType for PortWrapper {
    type Error = IoError;
}

impl embedded_io::Read for PortWrapper {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        std::io::Read::read(&mut self.0, buf).map_err(IoError)
    }
}

impl embedded_io::Write for PortWrapper {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        std::io::Write::write(&mut self.0, buf).map_err(IoError)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        std::io::Write::flush(&mut self.0).map_err(IoError)
    }
}

fn main() {
    // Get serial port from command line arg or interactive selection
    let port_name = env::args().nth(1).unwrap_or_else(|| {
        let ports = serialport::available_ports().expect("Failed to enumerate serial ports");

        if ports.is_empty() {
            eprintln!("No serial ports found!");
            std::process::exit(1);
        }

        let port_names: Vec<String> = ports.iter().map(|p| p.port_name.clone()).collect();

        Select::new("Select a serial port:", port_names)
            .prompt()
            .expect("Failed to select port")
    });

    println!("Using port: {}", port_name);

    let port = serialport::new(&port_name, BAUD_RATE)
        .timeout(std::time::Duration::from_millis(SERIAL_TIMEOUT_MS))
        .open()
        .expect("Failed to open serial port");

    let mut device: TriSense<PortWrapper> = TriSense::new(PortWrapper(port));

    // Put CH1 into current mode with a fixed setpoint before monitoring.
    let cmd = ConfigCommand::new(SETPOINT_CHANNEL, SETPOINT_METHOD, SETPOINT_VALUE).unwrap();
    match device.send_config(&cmd) {
        Ok(()) => println!(
            "Configured {:?} for method {} at {}",
            SETPOINT_CHANNEL,
            SETPOINT_METHOD.letter(),
            SETPOINT_VALUE
        ),
        Err(e) => eprintln!("Config not acknowledged: {e}"),
    }

    let start = Instant::now();
    loop {
        let now = Timestamp::from_ticks(start.elapsed().as_millis() as u64);
        match device.poll(now) {
            Ok(readings) => {
                for reading in &readings {
                    let t = reading.timestamp.ticks() as f64 / 1000.0;
                    for (channel, ch) in reading.channels() {
                        println!(
                            "[{t:9.3}s] {channel:?}: V={} I={} R={:.3} P={:.1}",
                            ch.voltage, ch.current, ch.resistance, ch.power
                        );
                    }
                }
            }
            Err(e) => {
                eprintln!("Poll failed: {e}");
                break;
            }
        }
        std::thread::sleep(std::time::Duration::from_millis(POLL_INTERVAL_MS));
    }
}
