//! Labelled transition systems and output sinks.
//!
//! # AUT format
//!
//! ```text
//! des (0,3,2)
//! (0,"a",1)
//! (1,"b",0)
//! (1,"c",1)
//! ```
//!
//! The header names the initial state, the number of transitions and the
//! number of states. The totals are only known once generation is complete,
//! so [`AutWriter`] first writes an all-blank placeholder line of fixed width
//! and overwrites it in place when finished. A file whose first line is blank
//! comes from an incomplete run.

use std::fmt;
use std::fs::File;
use std::io::{self, BufWriter, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use log::debug;

use crate::dot::DotConfig;
use crate::error::{Error, Result};

/// Width of the AUT header line, newline excluded.
pub const AUT_HEADER_WIDTH: usize = 80;

/// An in-memory transition system with numbered states.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Lts {
    initial_state: usize,
    num_states: usize,
    transitions: Vec<(usize, String, usize)>,
}

impl Lts {
    pub fn new(initial_state: usize) -> Self {
        Lts {
            initial_state,
            num_states: 0,
            transitions: Vec::new(),
        }
    }

    pub fn initial_state(&self) -> usize {
        self.initial_state
    }

    pub fn num_states(&self) -> usize {
        self.num_states
    }

    pub fn set_num_states(&mut self, n: usize) {
        self.num_states = n;
    }

    pub fn num_transitions(&self) -> usize {
        self.transitions.len()
    }

    pub fn transitions(&self) -> &[(usize, String, usize)] {
        &self.transitions
    }

    pub fn add_transition(&mut self, source: usize, label: impl Into<String>, target: usize) {
        self.num_states = self.num_states.max(source + 1).max(target + 1);
        self.transitions.push((source, label.into(), target));
    }

    /// Outgoing transitions of `state`.
    pub fn outgoing(&self, state: usize) -> impl Iterator<Item = (&str, usize)> {
        self.transitions
            .iter()
            .filter(move |(s, _, _)| *s == state)
            .map(|(_, l, t)| (l.as_str(), *t))
    }
}

/// Writes the AUT representation, header included.
impl fmt::Display for Lts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{}",
            aut_header(self.initial_state, self.transitions.len(), self.num_states)
        )?;
        for (s, l, t) in &self.transitions {
            writeln!(f, "({},\"{}\",{})", s, l, t)?;
        }
        Ok(())
    }
}

pub fn aut_header(initial: usize, transitions: usize, states: usize) -> String {
    format!("des ({},{},{})", initial, transitions, states)
}

/// Streaming AUT writer with a placeholder header.
pub struct AutWriter<W: Write + Seek> {
    writer: BufWriter<W>,
    transitions: usize,
}

impl<W: Write + Seek> AutWriter<W> {
    /// Writes the blank placeholder header.
    pub fn new(inner: W) -> io::Result<Self> {
        let mut writer = BufWriter::new(inner);
        writeln!(writer, "{:width$}", "", width = AUT_HEADER_WIDTH)?;
        Ok(AutWriter {
            writer,
            transitions: 0,
        })
    }

    pub fn transition(&mut self, source: usize, label: &str, target: usize) -> io::Result<()> {
        self.transitions += 1;
        writeln!(self.writer, "({},\"{}\",{})", source, label, target)
    }

    pub fn num_transitions(&self) -> usize {
        self.transitions
    }

    /// Flushes the transitions and keeps the blank placeholder, marking the
    /// file as incomplete.
    pub fn abandon(mut self) -> io::Result<W> {
        self.writer.flush()?;
        self.writer.into_inner().map_err(|e| e.into_error())
    }

    /// Overwrites the placeholder with the final header.
    pub fn finish(mut self, initial: usize, states: usize) -> io::Result<W> {
        self.writer.flush()?;
        let header = aut_header(initial, self.transitions, states);
        if header.len() > AUT_HEADER_WIDTH {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("AUT header '{}' exceeds the placeholder width", header),
            ));
        }
        self.writer.seek(SeekFrom::Start(0))?;
        write!(self.writer, "{:width$}", header, width = AUT_HEADER_WIDTH)?;
        self.writer.flush()?;
        self.writer.into_inner().map_err(|e| e.into_error())
    }
}

/// Where generated transitions go.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Output {
    /// Count only.
    #[default]
    None,
    /// Stream to an AUT file.
    Aut(PathBuf),
    /// Keep the transition system in memory.
    Memory,
    /// Keep it in memory and render it as DOT into the file when finished.
    Dot(PathBuf),
}

/// An opened [`Output`].
pub(crate) enum Sink {
    None { transitions: usize },
    Aut { path: PathBuf, writer: AutWriter<File> },
    Memory(Lts),
    Dot { path: PathBuf, lts: Lts },
}

impl Sink {
    pub(crate) fn open(output: &Output, initial: usize) -> Result<Self> {
        Ok(match output {
            Output::None => Sink::None { transitions: 0 },
            Output::Aut(path) => {
                debug!("writing AUT to '{}'", path.display());
                let file = File::create(path).map_err(|e| Error::io(path, e))?;
                let writer = AutWriter::new(file).map_err(|e| Error::io(path, e))?;
                Sink::Aut {
                    path: path.clone(),
                    writer,
                }
            }
            Output::Memory => Sink::Memory(Lts::new(initial)),
            Output::Dot(path) => Sink::Dot {
                path: path.clone(),
                lts: Lts::new(initial),
            },
        })
    }

    pub(crate) fn transition(&mut self, source: usize, label: &str, target: usize) -> Result<()> {
        match self {
            Sink::None { transitions } => *transitions += 1,
            Sink::Aut { path, writer } => writer
                .transition(source, label, target)
                .map_err(|e| Error::io(path.as_path(), e))?,
            Sink::Memory(lts) | Sink::Dot { lts, .. } => lts.add_transition(source, label, target),
        }
        Ok(())
    }

    pub(crate) fn num_transitions(&self) -> usize {
        match self {
            Sink::None { transitions } => *transitions,
            Sink::Aut { writer, .. } => writer.num_transitions(),
            Sink::Memory(lts) | Sink::Dot { lts, .. } => lts.num_transitions(),
        }
    }

    /// Completes the output. Returns the in-memory system, if any.
    pub(crate) fn close(self, initial: usize, states: usize) -> Result<Option<Lts>> {
        match self {
            Sink::None { .. } => Ok(None),
            Sink::Aut { path, writer } => {
                writer
                    .finish(initial, states)
                    .map_err(|e| Error::io(path.as_path(), e))?;
                Ok(None)
            }
            Sink::Memory(mut lts) => {
                lts.set_num_states(states);
                Ok(Some(lts))
            }
            Sink::Dot { path, mut lts } => {
                lts.set_num_states(states);
                write_dot(&lts, &path)?;
                Ok(Some(lts))
            }
        }
    }

    /// Ends an incomplete run: AUT output keeps its placeholder header.
    pub(crate) fn abandon(self, states: usize) -> Result<Option<Lts>> {
        match self {
            Sink::Aut { path, writer } => {
                writer.abandon().map_err(|e| Error::io(path.as_path(), e))?;
                Ok(None)
            }
            sink => sink.close(0, states),
        }
    }
}

fn write_dot(lts: &Lts, path: &Path) -> Result<()> {
    let dot = lts
        .to_dot_with_config(&DotConfig::default())
        .map_err(|e| Error::io(path, io::Error::new(io::ErrorKind::Other, e)))?;
    std::fs::write(path, dot).map_err(|e| Error::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Cursor;

    #[test]
    fn test_placeholder_then_header() {
        let mut w = AutWriter::new(Cursor::new(Vec::new())).unwrap();
        w.transition(0, "a", 1).unwrap();
        w.transition(1, "b(2)", 0).unwrap();

        w.writer.flush().unwrap();
        let buffer = w.writer.get_ref().get_ref().clone();
        let text = String::from_utf8(buffer).unwrap();
        let first = text.lines().next().unwrap();
        assert!(first.trim().is_empty());
        assert_eq!(first.len(), AUT_HEADER_WIDTH);

        let cursor = w.finish(0, 2).unwrap();
        let text = String::from_utf8(cursor.into_inner()).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next().unwrap().trim_end(), "des (0,2,2)");
        assert_eq!(lines.next().unwrap(), "(0,\"a\",1)");
        assert_eq!(lines.next().unwrap(), "(1,\"b(2)\",0)");
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn test_abandon_keeps_placeholder() {
        let mut w = AutWriter::new(Cursor::new(Vec::new())).unwrap();
        w.transition(0, "a", 1).unwrap();
        let text = String::from_utf8(w.abandon().unwrap().into_inner()).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next().unwrap(), " ".repeat(AUT_HEADER_WIDTH));
        assert_eq!(lines.next().unwrap(), "(0,\"a\",1)");
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn test_lts_display() {
        let mut lts = Lts::new(0);
        lts.add_transition(0, "a", 1);
        lts.add_transition(1, "tau", 1);
        assert_eq!(lts.num_states(), 2);
        assert_eq!(lts.to_string(), "des (0,2,2)\n(0,\"a\",1)\n(1,\"tau\",1)\n");
        assert_eq!(lts.outgoing(1).collect::<Vec<_>>(), vec![("tau", 1)]);
    }

    #[test]
    fn test_sink_aut_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.aut");
        let mut sink = Sink::open(&Output::Aut(path.clone()), 0).unwrap();
        sink.transition(0, "a", 0).unwrap();
        assert_eq!(sink.num_transitions(), 1);
        sink.close(0, 1).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("des (0,1,1)"));
    }
}
