// Console I/O for the read and print built-ins

use std::collections::VecDeque;
use std::io::{self, BufRead, Cursor, Write};

/// Where printed lines go
enum Sink {
    Stdout(io::Stdout),
    Captured(String),
}

/// Line-oriented console: whitespace-delimited integer tokens in, lines out
///
/// [`Console::stdio`] talks to the process streams; [`Console::scripted`]
/// reads from a fixed string and records everything written, which is what
/// tests run against.
pub struct Console {
    reader: Box<dyn BufRead>,
    pending: VecDeque<String>,
    sink: Sink,
}

impl Console {
    pub fn stdio() -> Self {
        Console {
            reader: Box::new(io::BufReader::new(io::stdin())),
            pending: VecDeque::new(),
            sink: Sink::Stdout(io::stdout()),
        }
    }

    /// Console fed from `input` that captures its output
    pub fn scripted(input: &str) -> Self {
        Console {
            reader: Box::new(Cursor::new(input.as_bytes().to_vec())),
            pending: VecDeque::new(),
            sink: Sink::Captured(String::new()),
        }
    }

    /// Next whitespace-delimited token, or `None` at end of input
    pub fn read_token(&mut self) -> io::Result<Option<String>> {
        while self.pending.is_empty() {
            let mut line = String::new();
            if self.reader.read_line(&mut line)? == 0 {
                return Ok(None);
            }
            self.pending
                .extend(line.split_whitespace().map(str::to_string));
        }
        Ok(self.pending.pop_front())
    }

    /// Write `text` followed by a newline
    pub fn write_line(&mut self, text: &str) -> io::Result<()> {
        match &mut self.sink {
            Sink::Stdout(out) => {
                let mut out = out.lock();
                writeln!(out, "{}", text)?;
                out.flush()
            }
            Sink::Captured(buffer) => {
                buffer.push_str(text);
                buffer.push('\n');
                Ok(())
            }
        }
    }

    /// Everything written so far (empty for a stdio console)
    pub fn captured(&self) -> &str {
        match &self.sink {
            Sink::Stdout(_) => "",
            Sink::Captured(buffer) => buffer,
        }
    }

    /// Captured output split into lines
    pub fn output(&self) -> Vec<String> {
        self.captured().lines().map(str::to_string).collect()
    }
}

impl Default for Console {
    fn default() -> Self {
        Self::stdio()
    }
}

impl std::fmt::Debug for Console {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mode = match self.sink {
            Sink::Stdout(_) => "stdio",
            Sink::Captured(_) => "scripted",
        };
        f.debug_struct("Console")
            .field("mode", &mode)
            .field("pending", &self.pending)
            .finish()
    }
}
