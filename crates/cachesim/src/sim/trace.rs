//! Trace parsing.
//!
//! A trace line holds one or more records, each an operation token followed
//! by a hexadecimal address:
//!
//! ```text
//! # comment lines start with '#', e.g. the closing #eof
//! r 0x0000001f
//! w 0x00400020 r 0x7fff0004
//! ```
//!
//! `r`/`R`/`0` read and `w`/`W`/`1` write. The `0x` prefix is optional.
//! Every record of a line is parsed before any is handed out, so a bad line
//! contributes nothing.

use std::io::BufRead;
use std::vec;

use crate::cache::Operation;
use crate::common::error::{SimError, TraceError};

/// One decoded record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TraceRecord {
    /// 1-based line the record came from.
    pub line: usize,
    pub op: Operation,
    pub addr: u32,
}

/// Parses one trace line. Comment and blank lines yield no records.
pub fn parse_line(line: usize, text: &str) -> Result<Vec<TraceRecord>, TraceError> {
    let text = text.trim();
    if text.is_empty() || text.starts_with('#') {
        return Ok(Vec::new());
    }

    let mut records = Vec::new();
    let mut tokens = text.split_whitespace();
    while let Some(op_token) = tokens.next() {
        let op = parse_operation(op_token).ok_or_else(|| TraceError::UnknownOperation {
            line,
            token: op_token.to_string(),
        })?;
        let addr_token = tokens.next().ok_or_else(|| TraceError::MissingAddress {
            line,
            op: op_token.to_string(),
        })?;
        let addr = parse_address(addr_token).ok_or_else(|| TraceError::BadAddress {
            line,
            token: addr_token.to_string(),
        })?;
        records.push(TraceRecord { line, op, addr });
    }
    Ok(records)
}

fn parse_operation(token: &str) -> Option<Operation> {
    match token {
        "r" | "R" | "0" => Some(Operation::Read),
        "w" | "W" | "1" => Some(Operation::Write),
        _ => None,
    }
}

/// Parses a hexadecimal address with an optional `0x`/`0X` prefix.
pub fn parse_address(token: &str) -> Option<u32> {
    let digits = token
        .strip_prefix("0x")
        .or_else(|| token.strip_prefix("0X"))
        .unwrap_or(token);
    // from_str_radix accepts a leading '+', which is not an address.
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    u32::from_str_radix(digits, 16).ok()
}

/// Streams records out of a buffered reader.
pub struct TraceReader<R> {
    input: R,
    line: usize,
    pending: vec::IntoIter<TraceRecord>,
    buf: String,
    failed: bool,
}

impl<R: BufRead> TraceReader<R> {
    pub fn new(input: R) -> Self {
        Self {
            input,
            line: 0,
            pending: Vec::new().into_iter(),
            buf: String::new(),
            failed: false,
        }
    }

    /// Number of lines consumed so far.
    pub fn lines_read(&self) -> usize {
        self.line
    }
}

impl<R: BufRead> Iterator for TraceReader<R> {
    type Item = Result<TraceRecord, SimError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(record) = self.pending.next() {
                return Some(Ok(record));
            }
            if self.failed {
                return None;
            }

            self.buf.clear();
            match self.input.read_line(&mut self.buf) {
                Ok(0) => return None,
                Ok(_) => {
                    self.line += 1;
                    match parse_line(self.line, &self.buf) {
                        Ok(records) => self.pending = records.into_iter(),
                        Err(e) => {
                            self.failed = true;
                            return Some(Err(e.into()));
                        }
                    }
                }
                Err(e) => {
                    self.failed = true;
                    return Some(Err(SimError::io("<input>", e)));
                }
            }
        }
    }
}
