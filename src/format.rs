//! Output formats and the incremental encoder the sink drives line by line.
//!
//! The encoder never buffers more than the line it is given: the JSON array is
//! produced by emitting the opening bracket up front, each element with its
//! separator as it arrives, and the closing bracket once the stream ends.

use std::fmt;
use std::str::FromStr;

use crate::error::CliError;

const JSON_INDENT: &str = "    ";

/// How each line is serialized on the way out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// One line of output per input line, verbatim
    #[default]
    Text,
    /// A single pretty-printed JSON array of strings
    Json,
}

impl OutputFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            OutputFormat::Text => "text",
            OutputFormat::Json => "json",
        }
    }

    pub fn encoder(self) -> Encoder {
        Encoder {
            format: self,
            count: 0,
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = CliError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            other => Err(CliError::InvalidFormat(other.to_string())),
        }
    }
}

/// Stateful serializer for one output stream.
pub struct Encoder {
    format: OutputFormat,
    count: u64,
}

impl Encoder {
    /// Appends whatever has to precede the first line.
    pub fn open(&self, out: &mut String) {
        if self.format == OutputFormat::Json {
            out.push('[');
        }
    }

    /// Appends the encoding of one line, separators included.
    pub fn push(&mut self, line: &str, out: &mut String) -> serde_json::Result<()> {
        match self.format {
            OutputFormat::Text => {
                out.push_str(line);
                out.push('\n');
            }
            OutputFormat::Json => {
                if self.count > 0 {
                    out.push(',');
                }
                out.push('\n');
                out.push_str(JSON_INDENT);
                out.push_str(&serde_json::to_string(line)?);
            }
        }
        self.count += 1;
        Ok(())
    }

    /// Appends the trailer once the input is exhausted.
    pub fn close(&self, out: &mut String) {
        if self.format == OutputFormat::Json {
            // an empty array never gets the newline that precedes elements
            if self.count == 0 {
                out.push_str("]\n");
            } else {
                out.push_str("\n]\n");
            }
        }
    }

    /// Lines encoded so far
    pub fn count(&self) -> u64 {
        self.count
    }
}
