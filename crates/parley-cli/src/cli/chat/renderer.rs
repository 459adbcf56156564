//! Plain-text reply rendering for the chat loop.
//!
//! Replies are shown as plain text, word-wrapped to the terminal width and
//! indented under a speaker label. During streaming, deltas are written raw
//! as they arrive. Width is measured with `console`, so wide (CJK) glyphs
//! count as two columns.

use std::fmt::Display;
use std::io::Write;

use console::{measure_text_width, style};

/// Columns reserved for the left indent and a right margin.
const GUTTER: usize = 4;

/// Narrowest wrap width, for very small terminals.
const MIN_WIDTH: usize = 20;

/// Tabs are expanded to this before measuring.
const TAB: &str = "    ";

/// Writes chat output to `W` (the readline `SharedWriter` in the live loop).
pub struct ChatRenderer<W: Write> {
    out: W,
    width: usize,
}

impl<W: Write> ChatRenderer<W> {
    /// Create a renderer sized to the current terminal.
    pub fn new(out: W) -> Self {
        let (_rows, cols) = console::Term::stdout().size();
        Self::with_width(out, cols as usize)
    }

    pub fn with_width(out: W, width: usize) -> Self {
        Self {
            out,
            width: width.saturating_sub(GUTTER).max(MIN_WIDTH),
        }
    }

    /// Access the underlying writer (e.g. for `write_help`).
    pub fn writer(&mut self) -> &mut W {
        &mut self.out
    }

    /// Write one indented line.
    pub fn line(&mut self, text: impl Display) {
        let _ = writeln!(self.out, "  {text}");
    }

    pub fn blank(&mut self) {
        let _ = writeln!(self.out);
    }

    /// Print a complete reply under the model label.
    pub fn print_reply(&mut self, text: &str) {
        self.blank();
        self.line(style("Gemini").cyan().bold());
        for line in wrap_text(text, self.width) {
            self.line(line);
        }
    }

    /// Print the speaker label that precedes streamed deltas.
    pub fn start_streamed_reply(&mut self) {
        self.blank();
        self.line(style("Gemini").cyan().bold());
        let _ = write!(self.out, "  ");
    }

    /// Print the stats footer after a reply.
    ///
    /// Format: "| {tokens} tokens . {time}s . {model}"
    pub fn print_stats_footer(&mut self, tokens: u32, response_ms: u64, model: &str) {
        let seconds = response_ms as f64 / 1000.0;
        let _ = writeln!(
            self.out,
            "\n  {} {} tokens {} {:.1}s {} {}",
            style("|").dim(),
            style(tokens).dim(),
            style("\u{00b7}").dim(),
            style(seconds).dim(),
            style("\u{00b7}").dim(),
            style(model).dim(),
        );
        self.blank();
    }

    /// Print a failure notice with a hint on how to continue.
    pub fn print_error(&mut self, message: &str) {
        self.blank();
        self.line(format!("{} {message}", style("!").red().bold()));
        self.line(style("Type a message to try again, /exit to quit.").dim());
        self.blank();
    }

    /// Print a one-line informational notice.
    pub fn print_notice(&mut self, message: impl Display) {
        self.line(format!("{} {message}", style("i").blue().bold()));
    }
}

/// Word-wrap `text` to `width` columns.
///
/// Line breaks, leading indentation, and the spacing between words are kept
/// as written; a line is only broken where it overflows. Continuation lines
/// start at column zero. Words longer than a line, or runs of text without
/// spaces such as CJK, are broken at character boundaries.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut out = Vec::new();

    for source_line in text.lines() {
        let source_line = source_line.replace('\t', TAB);
        let body = source_line.trim_start();
        let indent = &source_line[..source_line.len() - body.len()];

        let mut current = String::new();
        let mut current_width = 0;
        let mut has_word = false;
        let mut gap = "";

        let indent_width = measure_text_width(indent);
        if indent_width < width {
            current.push_str(indent);
            current_width = indent_width;
        }

        for (is_space, token) in split_runs(body) {
            if is_space {
                gap = token;
                continue;
            }

            let word_width = measure_text_width(token);
            let gap_width = if has_word { measure_text_width(gap) } else { 0 };

            if current_width + gap_width + word_width <= width {
                if has_word {
                    current.push_str(gap);
                }
                current.push_str(token);
                current_width += gap_width + word_width;
                has_word = true;
                continue;
            }

            if has_word {
                out.push(std::mem::take(&mut current));
                current_width = 0;
            }
            has_word = true;

            if current_width + word_width <= width {
                current.push_str(token);
                current_width += word_width;
                continue;
            }

            let mut buf = [0u8; 4];
            for ch in token.chars() {
                let ch_width = measure_text_width(ch.encode_utf8(&mut buf));
                if current_width + ch_width > width && current_width > 0 {
                    out.push(std::mem::take(&mut current));
                    current_width = 0;
                }
                current.push(ch);
                current_width += ch_width;
            }
        }

        out.push(current);
    }

    out
}

/// Split `s` into alternating runs of whitespace and non-whitespace.
fn split_runs(s: &str) -> Vec<(bool, &str)> {
    let mut runs = Vec::new();
    let mut start = 0;
    let mut in_space = None;

    for (i, ch) in s.char_indices() {
        let space = ch.is_whitespace();
        if let Some(prev) = in_space {
            if prev != space {
                runs.push((prev, &s[start..i]));
                start = i;
            }
        }
        in_space = Some(space);
    }
    if let Some(prev) = in_space {
        runs.push((prev, &s[start..]));
    }

    runs
}
