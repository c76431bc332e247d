// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::io::Write;

use pl_core::Message;

use crate::cli::OutputFormat;
use crate::error::Result;

/// Format a single message as one line.
///
/// Output format:
/// ```text
/// [2025-01-02 03:04] Alice: see you there
/// [2025-01-02 03:05] Bob: on my way (sending)
/// ```
pub fn format_message(message: &Message) -> String {
    let mut line = format!(
        "[{}] {}: {}",
        message.timestamp.format("%Y-%m-%d %H:%M"),
        message.sender_name,
        message.text
    );
    if message.pending {
        line.push_str(" (sending)");
    }
    line
}

/// Write messages in the requested format.
pub fn write_messages(out: &mut impl Write, messages: &[Message], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => {
            if messages.is_empty() {
                writeln!(out, "No messages.")?;
            }
            for message in messages {
                writeln!(out, "{}", format_message(message))?;
            }
        }
        OutputFormat::Json => {
            writeln!(out, "{}", serde_json::to_string_pretty(messages)?)?;
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "display_tests.rs"]
mod tests;
