use std::io;
use std::time::Duration;

use serial_midi::{
    buffer::RingBuffer,
    parser::{Parser, Settings},
    DEFAULT_SYSEX_MAX_SIZE, MIDI_BAUDRATE,
};

const PORT_NAME: &'static str = "/dev/ttyUSB0";

fn main() {
    let port = serialport::new(PORT_NAME, MIDI_BAUDRATE)
        .timeout(Duration::from_millis(10))
        .open();

    let mut incoming = RingBuffer::<1024>::new();
    let mut parser = Parser::<DEFAULT_SYSEX_MAX_SIZE>::new(Settings::default());

    match port {
        Ok(mut port) => {
            let mut serial_buf: Vec<u8> = vec![0; 1000];
            loop {
                match port.read(serial_buf.as_mut_slice()) {
                    Ok(t) => {
                        incoming.write_slice(&serial_buf[..t]);
                        while parser.parse(&mut incoming) {
                            println!("received message = {:?}", parser.message());
                        }
                    }
                    Err(ref e) if e.kind() == io::ErrorKind::TimedOut => (),
                    Err(e) => eprintln!("{:?}", e),
                }
            }
        }
        Err(e) => {
            eprintln!("Failed to open \"{}\". Error: {}", PORT_NAME, e);
            ::std::process::exit(1);
        }
    }
}
