//! Response framing for the dispatch loop.
//!
//! Every response is a single write of UTF-8 text ending in a newline. The
//! writer appends the terminator when the payload lacks one and flushes after
//! each response so clients never wait on buffered bytes.

use std::io::Write;

use super::errors::DispatchError;

/// Writer that frames text responses onto a stream.
pub struct ResponseWriter<W> {
    writer: W,
}

impl<W: Write> ResponseWriter<W> {
    /// Creates a new response writer wrapping the given output stream.
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Writes one response, newline terminated, and flushes.
    ///
    /// # Errors
    ///
    /// Returns an error if writing or flushing fails.
    pub fn write_text(&mut self, text: &str) -> Result<(), DispatchError> {
        let mut framed = String::with_capacity(text.len() + 1);
        framed.push_str(text);
        if !framed.ends_with('\n') {
            framed.push('\n');
        }
        self.writer.write_all(framed.as_bytes())?;
        self.writer.flush()?;
        Ok(())
    }

    /// Writes the client-facing text of an error.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn write_error(&mut self, error: &DispatchError) -> Result<(), DispatchError> {
        self.write_text(&error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("No files found", "No files found\n")]
    #[case("alpha\nbeta\n", "alpha\nbeta\n")]
    #[case("", "\n")]
    fn terminates_every_response(#[case] text: &str, #[case] expected: &str) {
        let mut output = Vec::new();
        ResponseWriter::new(&mut output)
            .write_text(text)
            .expect("write response");
        assert_eq!(String::from_utf8(output).expect("utf8"), expected);
    }

    #[test]
    fn writes_error_text() {
        let mut output = Vec::new();
        let error = DispatchError::invalid_syntax("dirlist", "missing flag");
        ResponseWriter::new(&mut output)
            .write_error(&error)
            .expect("write error");
        assert_eq!(output, b"Invalid dirlist command syntax\n");
    }
}
