use std::{
  io,
  sync::{Arc, Mutex},
};

use tracing::subscriber::DefaultGuard;

// Collects formatted log lines emitted on the current thread while the
// returned guard is alive. Pair with the current-thread tokio test runtime.
#[derive(Clone, Default)]
pub struct LogCapture(Arc<Mutex<Vec<u8>>>);

impl LogCapture {
  pub fn install() -> (Self, DefaultGuard) {
    let capture = Self::default();
    let writer = capture.clone();
    let subscriber = tracing_subscriber::fmt()
      .with_max_level(tracing::Level::DEBUG)
      .with_ansi(false)
      .with_writer(move || writer.clone())
      .finish();

    (capture, tracing::subscriber::set_default(subscriber))
  }

  pub fn contents(&self) -> String {
    String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
  }
}

impl io::Write for LogCapture {
  fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
    self.0.lock().unwrap().extend_from_slice(buf);
    Ok(buf.len())
  }

  fn flush(&mut self) -> io::Result<()> {
    Ok(())
  }
}
