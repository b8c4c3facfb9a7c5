#![allow(dead_code)]

use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use nsdebug::Runtime;

/// In-memory sink whose contents can be inspected after logging.
#[derive(Clone, Default)]
pub struct Capture(Arc<Mutex<Vec<u8>>>);

impl Capture {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }

    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(String::from).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.0.lock().unwrap().is_empty()
    }

    pub fn clear(&self) {
        self.0.lock().unwrap().clear();
    }
}

impl Write for Capture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// A fresh runtime writing uncolored output into a capture buffer.
pub fn capture_runtime() -> (Runtime, Capture) {
    let runtime = Runtime::new();
    let capture = Capture::default();
    runtime.set_writer(capture.clone());
    runtime.set_has_colors(false);
    (runtime, capture)
}
