//! Text traces of line transitions.
//!
//! One event per line: `<time_ms> <line> <level>`, where line is 0 (DATA0) or 1 (DATA1) and
//! level is 0 (low) or 1 (high). Blank lines and `#` comments are ignored.

use std::io::{BufRead, Write};

use wiegand_lib::Line;
use wiegand_lib::pulse::LineSample;

use crate::error::Error;

fn field<'a>(fields: &mut impl Iterator<Item = &'a str>, line: usize, name: &str) -> Result<&'a str, Error> {
    fields.next().ok_or_else(|| Error::Trace {
        line,
        message: format!("missing {}", name),
    })
}

pub fn parse_line(text: &str, line: usize) -> Result<Option<LineSample>, Error> {
    let text = text.split('#').next().unwrap_or_default().trim();
    if text.is_empty() {
        return Ok(None);
    }

    let mut fields = text.split_whitespace();
    let at_ms = field(&mut fields, line, "time")?;
    let index = field(&mut fields, line, "line")?;
    let level = field(&mut fields, line, "level")?;
    if let Some(extra) = fields.next() {
        return Err(Error::Trace {
            line,
            message: format!("unexpected field '{}'", extra),
        });
    }

    let at_ms = at_ms.parse::<u32>().map_err(|e| Error::Trace {
        line,
        message: format!("bad time '{}': {}", at_ms, e),
    })?;
    let line_index = index.parse::<u8>().map_err(|e| Error::Trace {
        line,
        message: format!("bad line '{}': {}", index, e),
    })?;
    let level = match level {
        "0" => false,
        "1" => true,
        other => {
            return Err(Error::Trace {
                line,
                message: format!("bad level '{}', expected 0 or 1", other),
            });
        }
    };

    Ok(Some(LineSample {
        at_ms,
        line: Line::from_index(line_index)?,
        level,
    }))
}

pub fn read_trace(reader: impl BufRead) -> Result<Vec<LineSample>, Error> {
    let mut samples = Vec::new();
    for (i, text) in reader.lines().enumerate() {
        if let Some(sample) = parse_line(&text?, i + 1)? {
            samples.push(sample);
        }
    }
    Ok(samples)
}

pub fn write_trace(mut writer: impl Write, samples: impl IntoIterator<Item = LineSample>) -> Result<(), Error> {
    for sample in samples {
        writeln!(
            writer,
            "{} {} {}",
            sample.at_ms,
            u8::from(sample.line),
            u8::from(sample.level)
        )?;
    }
    Ok(())
}
