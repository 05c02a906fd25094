//! Line reader for the output of child processes.

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};

/// Reads a child's stdout or stderr line by line until the pipe closes.
///
/// Lines are split on raw bytes and decoded lossily, so output that is not
/// UTF-8 is still passed on and the pipe is never abandoned early. A child
/// writing into an abandoned pipe would be killed by `SIGPIPE`.
pub struct OutputLines<R> {
    reader: BufReader<R>,
    buf: Vec<u8>,
}

impl<R: AsyncRead + Unpin> OutputLines<R> {
    pub fn new(stream: R) -> Self {
        Self {
            reader: BufReader::new(stream),
            buf: Vec::new(),
        }
    }

    /// The next line without its terminator, or `None` once the stream ends.
    pub async fn next_line(&mut self) -> Option<String> {
        self.buf.clear();
        match self.reader.read_until(b'\n', &mut self.buf).await {
            Ok(0) => None,
            Ok(_) => {
                let line = String::from_utf8_lossy(&self.buf);
                Some(line.trim_end_matches(['\n', '\r']).to_string())
            }
            Err(err) => {
                tracing::debug!("Stopped reading process output: {err}");
                None
            }
        }
    }
}
