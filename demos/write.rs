use ::std::{thread, time};
use std::io::Write;
use std::time::Duration;

use serial_midi::{encoder::Encoder, heapless::Vec, MIDI_BAUDRATE};

const PORT_NAME: &'static str = "/dev/ttyUSB0";

fn main() {
    let port = serialport::new(PORT_NAME, MIDI_BAUDRATE)
        .timeout(Duration::from_millis(10))
        .open();

    match port {
        Ok(mut port) => {
            // play a short arpeggio on channel 1, running status enabled
            let mut encoder = Encoder::new(Vec::<u8, 64>::new(), true);
            for note in [60u8, 64, 67, 72] {
                encoder.send_note_on(note, 100, 1);
                encoder.send_note_off(note, 0, 1);
            }
            port.write_all(&encoder.into_sink()).unwrap();
            thread::sleep(time::Duration::from_millis(250));
        }
        Err(e) => {
            eprintln!("Failed to open \"{}\". Error: {}", PORT_NAME, e);
            ::std::process::exit(1);
        }
    }
}
