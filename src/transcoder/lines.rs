use std::io::{self, BufRead};

use memchr::memchr2;

/// Reads physical lines from a buffered input, one at a time, into a
/// caller-owned buffer.
///
/// A line ends at `\n`, at `\r`, or at `\r\n`; the line break itself is
/// stripped. A final line without any line break is still returned. All other
/// bytes, including invalid UTF-8, pass through untouched.
pub struct PhysicalLines<'a, R: BufRead + ?Sized> {
    reader: &'a mut R,
    /// Number of lines read so far (1-based line number of the last line).
    line_number: u64,
    /// The last line ended at `\r`; a `\n` right after it belongs to the
    /// same line break.
    skip_lf: bool,
}

impl<'a, R: BufRead + ?Sized> PhysicalLines<'a, R> {
    pub fn new(reader: &'a mut R) -> Self {
        Self {
            reader,
            line_number: 0,
            skip_lf: false,
        }
    }

    /// Read the next line into `buf`, replacing its contents.
    ///
    /// Returns `Ok(false)` once the input is exhausted; `buf` is left empty in
    /// that case.
    pub fn read_line(&mut self, buf: &mut Vec<u8>) -> io::Result<bool> {
        buf.clear();
        let mut partial = false;

        loop {
            let available = match self.reader.fill_buf() {
                Ok(available) => available,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };
            if available.is_empty() {
                break;
            }

            if self.skip_lf {
                self.skip_lf = false;
                if available[0] == b'\n' {
                    self.reader.consume(1);
                    continue;
                }
            }

            match memchr2(b'\n', b'\r', available) {
                Some(at) => {
                    buf.extend_from_slice(&available[..at]);
                    self.skip_lf = available[at] == b'\r';
                    self.reader.consume(at + 1);
                    self.line_number += 1;
                    return Ok(true);
                }
                None => {
                    buf.extend_from_slice(available);
                    let consumed = available.len();
                    self.reader.consume(consumed);
                    partial = true;
                }
            }
        }

        if partial {
            self.line_number += 1;
        }
        Ok(partial)
    }

    pub fn line_number(&self) -> u64 {
        self.line_number
    }
}
