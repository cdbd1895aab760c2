use std::io::{self, BufRead, Write};

use tracing::{debug, info};

use crate::command::handle_request;
use crate::controller::Controller;

/// Serve newline-delimited JSON requests from `input` until it closes,
/// answering each with one JSON line on `output`.
pub fn serve<R: BufRead, W: Write>(ctrl: &Controller, input: R, mut output: W) -> io::Result<()> {
    for line in input.lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let response = handle_request(ctrl, line);
        let encoded = serde_json::to_string(&response).map_err(io::Error::other)?;
        writeln!(output, "{encoded}")?;
        output.flush()?;
        debug!(command = %response.command, "answered");
    }
    info!("request stream closed");
    Ok(())
}
