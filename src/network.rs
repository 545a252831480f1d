//! Networks of communicating linear processes.

use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::io;
use std::path::Path;
use std::str::FromStr;

use log::debug;

use crate::action::Label;
use crate::data::DataSpec;
use crate::error::{Error, Result};
use crate::vector::{parse_label, LineReader, SyncVector};

/// Header of the optional section listing extra boundary labels.
pub const ACTION_LABELS: &str = "action_labels";

/// `N` component references glued by a synchronization vector of length `N`.
///
/// Besides the result labels of the vector, a network carries extra boundary
/// labels, which quotienting uses to record the fresh labels it introduces.
///
/// # Text format
///
/// ```text
/// length
/// 2
/// lps_filenames
/// left.lps
/// right.lps
/// synchronization_vector
/// 2
/// 1
/// a b -> c()
/// ```
///
/// Extra boundary labels, if any, follow in a trailing section:
///
/// ```text
/// action_labels
/// 1
/// c1()
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Network {
    components: Vec<String>,
    vector: SyncVector,
    extra_labels: BTreeSet<Label>,
}

impl Network {
    pub fn new(components: Vec<String>, vector: SyncVector) -> Result<Self> {
        if vector.length() != components.len() {
            return Err(Error::mismatch(
                "network",
                format!(
                    "incompatible network size: {} components, vector of length {}",
                    components.len(),
                    vector.length()
                ),
            ));
        }
        Ok(Network {
            components,
            vector,
            extra_labels: BTreeSet::new(),
        })
    }

    pub fn components(&self) -> &[String] {
        &self.components
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub fn vector(&self) -> &SyncVector {
        &self.vector
    }

    /// All boundary labels: the vector labels plus the extra labels.
    pub fn labels(&self) -> BTreeSet<Label> {
        self.vector
            .labels()
            .iter()
            .chain(self.extra_labels.iter())
            .cloned()
            .collect()
    }

    /// Boundary labels that are not already declared by `alphabet`, the
    /// action labels of component 0.
    pub fn action_labels<'a>(&self, alphabet: impl IntoIterator<Item = &'a Label>) -> BTreeSet<Label> {
        let mut labels = self.labels();
        for l in alphabet {
            labels.remove(l);
        }
        labels
    }

    pub fn extra_labels(&self) -> &BTreeSet<Label> {
        &self.extra_labels
    }

    pub fn add_labels(&mut self, labels: impl IntoIterator<Item = Label>) {
        self.extra_labels.extend(labels);
    }

    pub fn normalize(&mut self, spec: &DataSpec) {
        self.vector.normalize(spec);
        self.extra_labels = self.extra_labels.iter().map(|l| l.normalize(spec)).collect();
    }

    fn read_from(lines: &mut LineReader<'_>) -> Result<Self> {
        lines.expect_token("length")?;
        let n: usize = lines.parse_next("number of components")?;
        lines.expect_token("lps_filenames")?;
        let mut components = Vec::with_capacity(n);
        for k in 0..n {
            match lines.next_value() {
                Some((_, "")) => return Err(lines.error(format!("empty reference of component {}", k))),
                Some((_, line)) => components.push(line.to_string()),
                None => return Err(lines.error(format!("missing reference of component {}", k))),
            }
        }
        let vector = SyncVector::read_from(lines)?;
        let mut extra_labels = BTreeSet::new();
        match lines.next_line() {
            None => {}
            Some((_, ACTION_LABELS)) => {
                let count: usize = lines.parse_next("number of action labels")?;
                for _ in 0..count {
                    let (number, line) = lines
                        .next_line()
                        .ok_or_else(|| lines.error(format!("expected {} action labels", count)))?;
                    let label = parse_label(line).map_err(|message| {
                        Error::mismatch(format!("{} line {} '{}'", lines.source(), number, line), message)
                    })?;
                    extra_labels.insert(label);
                }
                lines.expect_end()?;
            }
            Some((_, line)) => return Err(lines.error(format!("unexpected trailing line '{}'", line))),
        }
        debug!(
            "read network with {} components and {} vector entries",
            components.len(),
            vector.len()
        );
        let mut network = Network::new(components, vector)?;
        network.extra_labels = extra_labels;
        Ok(network)
    }

    /// Reads a network from `reader`; `source` names it in error messages.
    pub fn read(mut reader: impl io::Read, source: &str) -> Result<Self> {
        let mut text = String::new();
        reader.read_to_string(&mut text).map_err(|e| Error::io(source, e))?;
        Network::read_from(&mut LineReader::new(&text, source))
    }

    pub fn write(&self, mut writer: impl io::Write) -> io::Result<()> {
        write!(writer, "{}", self)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = fs::File::open(path).map_err(|e| Error::io(path, e))?;
        Network::read(io::BufReader::new(file), &path.display().to_string())
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let file = fs::File::create(path).map_err(|e| Error::io(path, e))?;
        let mut writer = io::BufWriter::new(file);
        self.write(&mut writer)
            .and_then(|()| io::Write::flush(&mut writer))
            .map_err(|e| Error::io(path, e))
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "length")?;
        writeln!(f, "{}", self.components.len())?;
        writeln!(f, "lps_filenames")?;
        for c in &self.components {
            writeln!(f, "{}", c)?;
        }
        write!(f, "{}", self.vector)?;
        if !self.extra_labels.is_empty() {
            writeln!(f, "{}", ACTION_LABELS)?;
            writeln!(f, "{}", self.extra_labels.len())?;
            for label in &self.extra_labels {
                writeln!(f, "{}", label.declaration())?;
            }
        }
        Ok(())
    }
}

impl FromStr for Network {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Network::read_from(&mut LineReader::new(s, "network"))
    }
}
