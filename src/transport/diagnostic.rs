//! # Diagnostic Sink
//!
//! Observe-only replacement for a transport. Prints one line of channel
//! values per cycle instead of driving the bus.

use std::io::{self, Write};

use tracing::warn;

use super::CommandSink;
use crate::controller::channel::{ChannelSet, SampledFrame};
use crate::error::Result;
use crate::frame::encoder::encode_frame;
use crate::frame::protocol::hex_dump;

/// Renders `Name (label): value` pairs in wire order.
///
/// # Examples
///
/// ```
/// use pad_bridge::controller::channel::{ChannelSet, SampledFrame};
/// use pad_bridge::transport::diagnostic::render_line;
///
/// let line = render_line(&ChannelSet::three_axis(), &SampledFrame::new(vec![0, 0, 10000]));
/// assert_eq!(line, "Side (x): 0, Front (y): 0, Vertical (z): 10000");
/// ```
#[must_use]
pub fn render_line(channels: &ChannelSet, frame: &SampledFrame) -> String {
    channels
        .iter()
        .zip(frame.iter())
        .map(|(channel, value)| match &channel.label {
            Some(label) => format!("{} ({}): {}", channel.name, label, value),
            None => format!("{}: {}", channel.name, value),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Text sink for observe-only runs
pub struct DiagnosticSink<W: Write> {
    out: W,
    show_frame: bool,
}

impl DiagnosticSink<io::Stdout> {
    /// Sink printing to stdout, optionally with the encoded frame bytes.
    #[must_use]
    pub fn stdout(show_frame: bool) -> Self {
        Self::new(io::stdout()).with_frame_dump(show_frame)
    }
}

impl<W: Write> DiagnosticSink<W> {
    #[must_use]
    pub fn new(out: W) -> Self {
        Self {
            out,
            show_frame: false,
        }
    }

    /// Append the hex dump of the encoded frame to every line.
    #[must_use]
    pub fn with_frame_dump(mut self, show_frame: bool) -> Self {
        self.show_frame = show_frame;
        self
    }

    /// Writes one line. Write failures are logged and dropped.
    pub fn emit(&mut self, line: &str) {
        if let Err(e) = writeln!(self.out, "{}", line) {
            warn!("Diagnostic output failed: {}", e);
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> CommandSink for DiagnosticSink<W> {
    fn deliver(&mut self, channels: &ChannelSet, frame: &SampledFrame) -> Result<()> {
        let mut line = render_line(channels, frame);
        if self.show_frame {
            let bytes = encode_frame(channels, frame)?;
            line.push_str(" | ");
            line.push_str(&hex_dump(&bytes));
        }
        self.emit(&line);
        Ok(())
    }

    fn close(&mut self) {
        if let Err(e) = self.out.flush() {
            warn!("Failed to flush diagnostic output: {}", e);
        }
    }
}
