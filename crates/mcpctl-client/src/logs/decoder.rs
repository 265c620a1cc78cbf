//! Line framing for the follow-mode log stream

use mcpctl_core::LogLine;

/// Prefix marking a payload line; everything else is framing or keep-alive
pub const DATA_PREFIX: &str = "data: ";

/// Accumulates raw chunks and yields payloads of completed lines
///
/// Bytes are buffered rather than text so a multi-byte character split across
/// two reads decodes correctly once its line is complete.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    residual: Vec<u8>,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one chunk and return the payloads of every line it completed
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<LogLine> {
        self.residual.extend_from_slice(chunk);

        let Some(last_newline) = self.residual.iter().rposition(|b| *b == b'\n') else {
            return Vec::new();
        };

        let rest = self.residual.split_off(last_newline + 1);
        let complete = std::mem::replace(&mut self.residual, rest);

        complete[..last_newline]
            .split(|b| *b == b'\n')
            .filter_map(payload)
            .collect()
    }

    /// Bytes of the unterminated line carried into the next chunk
    pub fn pending(&self) -> usize {
        self.residual.len()
    }

    /// End of stream; an unterminated line is dropped. Returns its length.
    pub fn finish(self) -> usize {
        self.residual.len()
    }
}

fn payload(line: &[u8]) -> Option<LogLine> {
    let text = String::from_utf8_lossy(line);
    text.strip_prefix(DATA_PREFIX).map(LogLine::new)
}
