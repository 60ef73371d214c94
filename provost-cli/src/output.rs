//! Report rendering in text or JSON form
//!
//! Every subcommand produces a serializable report payload and hands it
//! to an [`OutputWriter`]. The payload decides how it reads as text via
//! [`Render`]; the writer decides which form reaches stdout.

use std::io::Write;

use serde::Serialize;

use crate::cli::OutputFormat;
use crate::error::CliError;

/// Writes report payloads to stdout in the selected format.
pub struct OutputWriter {
    format: OutputFormat,
}

impl OutputWriter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Render a payload to stdout.
    pub fn render<T: Render + Serialize>(&self, payload: &T) -> Result<(), CliError> {
        let stdout = std::io::stdout();
        let mut handle = stdout.lock();
        self.render_to(payload, &mut handle)
    }

    /// Render a payload into the given writer.
    ///
    /// Text output goes through [`Render::render_text`]; JSON output is
    /// pretty-printed with a trailing newline.
    pub fn render_to<T: Render + Serialize>(
        &self,
        payload: &T,
        out: &mut dyn Write,
    ) -> Result<(), CliError> {
        match self.format {
            OutputFormat::Text => {
                payload.render_text(out)?;
            }
            OutputFormat::Json => {
                serde_json::to_writer_pretty(&mut *out, payload)?;
                writeln!(out)?;
            }
        }
        Ok(())
    }
}

/// Human-readable rendering, implemented by every report payload
/// alongside `serde::Serialize`.
pub trait Render {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()>;
}
