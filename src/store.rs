//! Saving and restoring an [`Environment`] as plain text.
//!
//! One variable per line, `<name> <value> <0|1>`, where the last field is the const flag.
//! There is no header; a file is read until its end or its first malformed line.

use crate::env::Environment;
use crate::error::{CalcError, Result};
use crate::eval::format_value;
use std::fmt;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Lines, Write};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub name: String,
    pub value: f64,
    pub is_const: bool,
}

impl Record {
    pub fn parse(line: &str) -> Option<Record> {
        let mut fields = line.split(' ');

        let name = fields.next()?;
        let value: f64 = fields.next()?.parse().ok()?;
        let is_const = match fields.next()?.trim_end_matches(|c| c == '\r' || c == '\n') {
            "0" => false,
            "1" => true,
            _ => return None,
        };

        if fields.next().is_some() || !is_identifier(name) {
            return None;
        }

        Some(Record {
            name: name.to_string(),
            value,
            is_const,
        })
    }

    /// How `show` presents the record: as the statement that would recreate it.
    pub fn render(&self) -> String {
        let keyword = if self.is_const { "const" } else { "let" };
        format!("{} {} = {}", keyword, self.name, format_value(self.value))
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} {} {}",
            self.name,
            self.value,
            if self.is_const { 1 } else { 0 }
        )
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();

    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => chars.all(|c| c.is_ascii_alphanumeric()),
        _ => false,
    }
}

pub fn write_records<W: Write>(env: &Environment, mut out: W) -> io::Result<()> {
    for (name, var) in env.iter() {
        let record = Record {
            name: name.to_string(),
            value: var.value,
            is_const: var.is_const,
        };

        writeln!(out, "{}", record)?;
    }

    out.flush()
}

/// Reads records until the input ends, fails, or holds a malformed line.
pub struct Records<R> {
    lines: Lines<R>,
    done: bool,
}

impl<R: BufRead> Records<R> {
    pub fn new(reader: R) -> Self {
        Records {
            lines: reader.lines(),
            done: false,
        }
    }
}

impl<R: BufRead> Iterator for Records<R> {
    type Item = Record;

    fn next(&mut self) -> Option<Record> {
        if self.done {
            return None;
        }

        let record = match self.lines.next() {
            Some(Ok(line)) => Record::parse(&line),
            _ => None,
        };

        self.done = record.is_none();
        record
    }
}

/// Named stores, resolved as files under a root directory.
#[derive(Debug, Clone)]
pub struct Store {
    root: PathBuf,
}

impl Store {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Store { root: root.into() }
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    /// Write every variable of `env`, replacing whatever `name` held before.
    pub fn save(&self, name: &str, env: &Environment) -> Result<usize> {
        let file = File::create(self.path(name)).map_err(|e| io_error(name, e))?;
        write_records(env, BufWriter::new(file)).map_err(|e| io_error(name, e))?;

        Ok(env.len())
    }

    /// Declare every record of `name` in `env`, overwriting names that already exist.
    pub fn load(&self, name: &str, env: &mut Environment) -> Result<usize> {
        let mut count = 0;

        for record in self.open(name)? {
            env.declare_or_overwrite(&record.name, record.value, record.is_const);
            count += 1;
        }

        Ok(count)
    }

    /// The records of `name` rendered as declarations; nothing is declared.
    pub fn show(&self, name: &str) -> Result<Vec<String>> {
        Ok(self.open(name)?.map(|r| r.render()).collect())
    }

    fn open(&self, name: &str) -> Result<Records<BufReader<File>>> {
        let file = File::open(self.path(name)).map_err(|e| io_error(name, e))?;
        Ok(Records::new(BufReader::new(file)))
    }
}

fn io_error(name: &str, source: io::Error) -> CalcError {
    CalcError::Io {
        path: name.to_string(),
        source,
    }
}
