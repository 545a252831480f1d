//! Synchronization vectors.
//!
//! A synchronization vector describes the permitted joint steps of a network
//! of `N` components: every entry maps a tuple of per-component local action
//! names (or [`Tag::Inactive`]) to one resulting action label.
//!
//! # Text format
//!
//! ```text
//! synchronization_vector
//! 2
//! 3
//! a inactive -> a()
//! inactive b -> b()
//! a b -> c(Nat)
//! ```
//!
//! The header token is followed by the length `N`, the number of entries and
//! one line per entry. Blank lines and lines starting with `%` are ignored.

use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::io;
use std::path::Path;
use std::str::FromStr;

use log::debug;

use crate::action::Label;
use crate::data::{DataSpec, Sort};
use crate::error::{Error, Result};

pub const HEADER: &str = "synchronization_vector";
pub const INACTIVE: &str = "inactive";

/// Per-component entry of a synchronization vector.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Tag {
    /// The component does not take part in the step.
    Inactive,
    /// The component performs a local action with this name.
    Action(String),
}

impl Tag {
    pub fn action(name: impl Into<String>) -> Self {
        Tag::Action(name.into())
    }

    pub fn is_active(&self) -> bool {
        matches!(self, Tag::Action(_))
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            Tag::Inactive => None,
            Tag::Action(name) => Some(name),
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tag::Inactive => write!(f, "{}", INACTIVE),
            Tag::Action(name) => write!(f, "{}", name),
        }
    }
}

impl FromStr for Tag {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if s == INACTIVE {
            Ok(Tag::Inactive)
        } else if is_identifier(s) {
            Ok(Tag::action(s))
        } else {
            Err(Error::mismatch("synchronization vector tag", format!("invalid tag '{}'", s)))
        }
    }
}

/// One entry: `N` tags and the resulting label.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Entry {
    tags: Vec<Tag>,
    label: Label,
}

impl Entry {
    pub fn new(tags: Vec<Tag>, label: Label) -> Self {
        Entry { tags, label }
    }

    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    pub fn tag(&self, i: usize) -> &Tag {
        &self.tags[i]
    }

    pub fn label(&self) -> &Label {
        &self.label
    }

    /// Components taking part in this entry.
    pub fn participants(&self) -> impl Iterator<Item = usize> + '_ {
        self.tags
            .iter()
            .enumerate()
            .filter(|(_, t)| t.is_active())
            .map(|(j, _)| j)
    }

    /// Checks whether some component other than `i` is active.
    pub fn others_active(&self, i: usize) -> bool {
        self.participants().any(|j| j != i)
    }
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tags: Vec<String> = self.tags.iter().map(|t| t.to_string()).collect();
        write!(f, "{} -> {}", tags.join(" "), self.label.declaration())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncVector {
    entries: Vec<Entry>,
    labels: BTreeSet<Label>,
    length: Option<usize>,
}

impl SyncVector {
    /// Creates an empty vector for `length` components; `length` must be
    /// positive.
    pub fn new(length: usize) -> Result<Self> {
        if length == 0 {
            return Err(Error::mismatch("synchronization vector", "vector length must be at least 1"));
        }
        Ok(SyncVector {
            entries: Vec::new(),
            labels: BTreeSet::new(),
            length: Some(length),
        })
    }

    /// Creates an empty vector whose length is fixed by the first entry.
    pub fn with_open_length() -> Self {
        Self::default()
    }

    pub fn from_entries(length: usize, entries: impl IntoIterator<Item = Entry>) -> Result<Self> {
        let mut v = SyncVector::new(length)?;
        for e in entries {
            v.add_entry(e.tags, e.label)?;
        }
        Ok(v)
    }

    /// Appends an entry. The first entry fixes the length of a vector created
    /// by [`SyncVector::with_open_length`]; every other entry must match it.
    /// Tag, label and sort names must be writable in the text format.
    pub fn add_entry(&mut self, tags: Vec<Tag>, label: Label) -> Result<()> {
        if let Err(message) = check_entry(&tags, &label) {
            let entry = Entry::new(tags, label);
            return Err(Error::mismatch(
                format!("synchronization vector entry {} '{}'", self.entries.len(), entry),
                message,
            ));
        }
        match self.length {
            None => {
                if tags.is_empty() {
                    return Err(Error::mismatch(
                        format!("synchronization vector entry {}", self.entries.len()),
                        "entry without tags",
                    ));
                }
                self.length = Some(tags.len());
            }
            Some(n) if n != tags.len() => {
                let entry = Entry::new(tags, label);
                return Err(Error::mismatch(
                    format!("synchronization vector entry {} '{}'", self.entries.len(), entry),
                    format!("vector has length {}, entry has {} tags", n, entry.tags.len()),
                ));
            }
            Some(_) => {}
        }
        self.labels.insert(label.clone());
        self.entries.push(Entry::new(tags, label));
        Ok(())
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The number of components `N`; `0` while no entry fixed an open length.
    pub fn length(&self) -> usize {
        self.length.unwrap_or(0)
    }

    /// The result labels of all entries.
    pub fn labels(&self) -> &BTreeSet<Label> {
        &self.labels
    }

    /// Resolves sort aliases in all labels.
    pub fn normalize(&mut self, spec: &DataSpec) {
        for e in self.entries.iter_mut() {
            e.label = e.label.normalize(spec);
        }
        self.labels = self.labels.iter().map(|l| l.normalize(spec)).collect();
    }

    /// Reads a vector from a line source positioned at the header token.
    pub(crate) fn read_from(lines: &mut LineReader<'_>) -> Result<Self> {
        lines.expect_token(HEADER)?;
        let length: usize = lines.parse_next("vector length")?;
        if length == 0 {
            return Err(lines.error("vector length must be at least 1"));
        }
        let count: usize = lines.parse_next("number of entries")?;
        debug!("reading synchronization vector of length {} with {} entries", length, count);

        let mut v = SyncVector::new(length)?;
        for _ in 0..count {
            let (number, line) = lines
                .next_line()
                .ok_or_else(|| lines.error(format!("expected {} entries", count)))?;
            let (tags, label) = parse_entry(line).map_err(|message| {
                Error::mismatch(format!("{} line {} '{}'", lines.source(), number, line), message)
            })?;
            if tags.len() != length {
                return Err(Error::mismatch(
                    format!("{} line {} '{}'", lines.source(), number, line),
                    format!("expected {} tags, found {}", length, tags.len()),
                ));
            }
            v.add_entry(tags, label)?;
        }
        Ok(v)
    }

    /// Reads a vector from `reader`; `source` names it in error messages.
    pub fn read(mut reader: impl io::Read, source: &str) -> Result<Self> {
        let mut text = String::new();
        reader.read_to_string(&mut text).map_err(|e| Error::io(source, e))?;
        let mut lines = LineReader::new(&text, source);
        let v = SyncVector::read_from(&mut lines)?;
        lines.expect_end()?;
        Ok(v)
    }

    pub fn write(&self, mut writer: impl io::Write) -> io::Result<()> {
        write!(writer, "{}", self)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = fs::File::open(path).map_err(|e| Error::io(path, e))?;
        SyncVector::read(io::BufReader::new(file), &path.display().to_string())
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

impl fmt::Display for SyncVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", HEADER)?;
        writeln!(f, "{}", self.length())?;
        writeln!(f, "{}", self.entries.len())?;
        for e in &self.entries {
            writeln!(f, "{}", e)?;
        }
        Ok(())
    }
}

impl FromStr for SyncVector {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut lines = LineReader::new(s, "synchronization vector");
        let v = SyncVector::read_from(&mut lines)?;
        lines.expect_end()?;
        Ok(v)
    }
}

fn check_entry(tags: &[Tag], label: &Label) -> std::result::Result<(), String> {
    for tag in tags {
        if let Tag::Action(name) = tag {
            if !is_identifier(name) || name == INACTIVE {
                return Err(format!("invalid tag '{}'", name));
            }
        }
    }
    if !is_identifier(label.name()) || label.name() == INACTIVE {
        return Err(format!("invalid label name '{}'", label.name()));
    }
    match label.sorts().iter().find(|s| !is_sort(s.name())) {
        Some(sort) => Err(format!("invalid sort '{}' in label '{}'", sort, label.name())),
        None => Ok(()),
    }
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_' || c == '\'')
}

/// Checks `Name` or `Name(S1,...,Sk)` with nested sorts.
fn is_sort(s: &str) -> bool {
    match s.find('(') {
        None => is_identifier(s),
        Some(open) => match s[open + 1..].strip_suffix(')') {
            Some(inner) => {
                is_identifier(&s[..open])
                    && split_top_level(inner).is_some_and(|parts| parts.iter().all(|p| is_sort(p.trim())))
            }
            None => false,
        },
    }
}

/// Splits at commas outside parentheses; `None` when parentheses are
/// unbalanced.
fn split_top_level(s: &str) -> Option<Vec<&str>> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in s.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.checked_sub(1)?,
            ',' if depth == 0 => {
                parts.push(&s[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    if depth != 0 {
        return None;
    }
    parts.push(&s[start..]);
    Some(parts)
}

/// Parses `t1 ... tN -> name(S1,...,Sk)`.
fn parse_entry(line: &str) -> std::result::Result<(Vec<Tag>, Label), String> {
    let (lhs, rhs) = line
        .split_once("->")
        .ok_or_else(|| "missing '->'".to_string())?;
    let tags = lhs
        .split_whitespace()
        .map(|t| t.parse::<Tag>().map_err(|_| format!("invalid tag '{}'", t)))
        .collect::<std::result::Result<Vec<_>, _>>()?;
    let label = parse_label(rhs.trim())?;
    Ok((tags, label))
}

/// Parses a label declaration `name(S1,...,Sk)`; `name` and `name()` both
/// denote a label without arguments.
pub(crate) fn parse_label(text: &str) -> std::result::Result<Label, String> {
    let (name, sorts) = match text.find('(') {
        None => (text, Vec::new()),
        Some(open) => {
            let inner = text[open + 1..]
                .strip_suffix(')')
                .ok_or_else(|| format!("unbalanced parentheses in label '{}'", text))?;
            let sorts = if inner.trim().is_empty() {
                Vec::new()
            } else {
                split_top_level(inner)
                    .ok_or_else(|| format!("unbalanced parentheses in label '{}'", text))?
                    .into_iter()
                    .map(|s| {
                        let s = s.trim();
                        if is_sort(s) {
                            Ok(Sort::new(s))
                        } else {
                            Err(format!("invalid sort '{}' in label '{}'", s, text))
                        }
                    })
                    .collect::<std::result::Result<Vec<_>, _>>()?
            };
            (text[..open].trim(), sorts)
        }
    };
    if !is_identifier(name) || name == INACTIVE {
        return Err(format!("invalid label name '{}'", name));
    }
    Ok(Label::new(name, sorts))
}

/// Line-oriented reader shared by the vector and network formats. Tracks line
/// numbers for error messages; skips blank lines and `%` comments where a
/// keyword, number or entry is expected.
pub(crate) struct LineReader<'a> {
    lines: std::iter::Enumerate<std::str::Lines<'a>>,
    source: &'a str,
    last: usize,
}

impl<'a> LineReader<'a> {
    pub(crate) fn new(text: &'a str, source: &'a str) -> Self {
        LineReader {
            lines: text.lines().enumerate(),
            source,
            last: 0,
        }
    }

    pub(crate) fn source(&self) -> &str {
        self.source
    }

    /// Returns the next significant line (1-based number, trimmed text).
    pub(crate) fn next_line(&mut self) -> Option<(usize, &'a str)> {
        for (i, line) in self.lines.by_ref() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('%') {
                continue;
            }
            self.last = i + 1;
            return Some((i + 1, line));
        }
        None
    }

    /// Returns the next line verbatim apart from surrounding whitespace, so
    /// that free-form values such as file references may start with `%`.
    pub(crate) fn next_value(&mut self) -> Option<(usize, &'a str)> {
        let (i, line) = self.lines.next()?;
        self.last = i + 1;
        Some((i + 1, line.trim()))
    }

    pub(crate) fn error(&self, message: impl Into<String>) -> Error {
        Error::mismatch(format!("{} line {}", self.source, self.last), message)
    }

    pub(crate) fn expect_token(&mut self, token: &str) -> Result<()> {
        match self.next_line() {
            Some((_, line)) if line == token => Ok(()),
            Some((_, line)) => Err(self.error(format!("expected '{}', found '{}'", token, line))),
            None => Err(self.error(format!("expected '{}', found end of input", token))),
        }
    }

    pub(crate) fn parse_next<T: FromStr>(&mut self, what: &str) -> Result<T> {
        match self.next_line() {
            Some((_, line)) => line
                .parse()
                .map_err(|_| self.error(format!("expected {}, found '{}'", what, line))),
            None => Err(self.error(format!("expected {}, found end of input", what))),
        }
    }

    pub(crate) fn expect_end(&mut self) -> Result<()> {
        match self.next_line() {
            None => Ok(()),
            Some((_, line)) => Err(self.error(format!("unexpected trailing line '{}'", line))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use test_log::test;

    fn example() -> SyncVector {
        let mut v = SyncVector::new(2).unwrap();
        v.add_entry(vec![Tag::action("a"), Tag::Inactive], Label::simple("a"))
            .unwrap();
        v.add_entry(vec![Tag::Inactive, Tag::action("b")], Label::simple("b"))
            .unwrap();
        v.add_entry(
            vec![Tag::action("a"), Tag::action("b")],
            Label::new("c", [Sort::nat()]),
        )
        .unwrap();
        v
    }

    #[test]
    fn test_add_entry_fixes_length() {
        let mut v = SyncVector::with_open_length();
        assert_eq!(v.length(), 0);
        v.add_entry(vec![Tag::action("a"), Tag::Inactive], Label::simple("a"))
            .unwrap();
        assert_eq!(v.length(), 2);
        let err = v
            .add_entry(vec![Tag::action("a")], Label::simple("a"))
            .unwrap_err();
        assert!(matches!(err, Error::StructuralMismatch { .. }));
        assert_eq!(v.len(), 1);
    }

    #[test]
    fn test_zero_length_rejected() {
        assert!(matches!(SyncVector::new(0), Err(Error::StructuralMismatch { .. })));
        assert!(SyncVector::from_entries(0, []).is_err());
        let mut v = SyncVector::with_open_length();
        assert!(v.add_entry(vec![], Label::simple("a")).is_err());
    }

    #[test]
    fn test_unwritable_names_rejected() {
        let mut v = SyncVector::new(1).unwrap();
        for (tag, label) in [
            (Tag::action("a b"), Label::simple("a")),
            (Tag::action("inactive"), Label::simple("a")),
            (Tag::action("a"), Label::simple("x -> y")),
            (Tag::action("a"), Label::new("a", [Sort::new("List(Nat")])),
            (Tag::action("a"), Label::new("a", [Sort::new("")])),
        ] {
            let result = v.add_entry(vec![tag], label);
            assert!(matches!(result, Err(Error::StructuralMismatch { .. })), "{:?}", result);
        }
        assert!(v.is_empty());
        assert!(v.labels().is_empty());
    }

    #[test]
    fn test_round_trip_parameterised_sort() {
        let mut v = SyncVector::new(2).unwrap();
        let label = Label::new("put", [Sort::new("List(Nat)"), Sort::new("Pair(Bool,List(Pos))")]);
        v.add_entry(vec![Tag::action("s"), Tag::action("r")], label.clone())
            .unwrap();
        let text = v.to_string();
        assert!(text.ends_with("s r -> put(List(Nat),Pair(Bool,List(Pos)))\n"), "{}", text);
        let parsed: SyncVector = text.parse().unwrap();
        assert_eq!(parsed, v);
        assert_eq!(parsed.entries()[0].label(), &label);
    }

    #[test]
    fn test_labels() {
        let v = example();
        assert_eq!(v.labels().len(), 3);
        assert!(v.labels().contains(&Label::new("c", [Sort::nat()])));
    }

    #[test]
    fn test_serialize() {
        let text = example().to_string();
        assert_eq!(
            text,
            "synchronization_vector\n2\n3\na inactive -> a()\ninactive b -> b()\na b -> c(Nat)\n"
        );
    }

    #[test]
    fn test_round_trip() {
        let v = example();
        let parsed: SyncVector = v.to_string().parse().unwrap();
        assert_eq!(parsed, v);
    }

    #[test]
    fn test_parse_tolerates_blank_and_comments() {
        let text = "% example\nsynchronization_vector\n\n1\n2\na -> a\n  b   ->  b( Nat , Bool )\n";
        let v: SyncVector = text.parse().unwrap();
        assert_eq!(v.length(), 1);
        assert_eq!(
            v.entries()[1].label(),
            &Label::new("b", [Sort::nat(), Sort::bool()])
        );
    }

    #[test]
    fn test_parse_wrong_tag_count_names_line() {
        let text = "synchronization_vector\n2\n1\na b c -> x()\n";
        let err = text.parse::<SyncVector>().unwrap_err();
        match err {
            Error::StructuralMismatch { context, .. } => {
                assert!(context.contains("line 4"), "{}", context);
                assert!(context.contains("a b c -> x()"), "{}", context);
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_parse_failures() {
        for text in [
            "",
            "vector\n1\n0\n",
            "synchronization_vector\nx\n0\n",
            "synchronization_vector\n0\n0\n",
            "synchronization_vector\n1\n2\na -> a()\n",
            "synchronization_vector\n1\n1\na a()\n",
            "synchronization_vector\n1\n1\na -> a(Nat\n",
            "synchronization_vector\n1\n1\na -> a(List(Nat)\n",
            "synchronization_vector\n1\n1\na -> a(List)(Nat))\n",
            "synchronization_vector\n1\n1\na -> inactive()\n",
            "synchronization_vector\n1\n1\na -> a()\nb -> b()\n",
        ] {
            let result = text.parse::<SyncVector>();
            assert!(
                matches!(result, Err(Error::StructuralMismatch { .. })),
                "{:?} for {:?}",
                result,
                text
            );
        }
    }

    #[test]
    fn test_normalize() {
        let mut spec = DataSpec::new();
        spec.add_alias("Msg", "Nat").unwrap();
        let mut v = SyncVector::new(1).unwrap();
        v.add_entry(vec![Tag::action("s")], Label::new("s", [Sort::new("Msg")]))
            .unwrap();
        v.normalize(&spec);
        assert_eq!(v.entries()[0].label(), &Label::new("s", [Sort::nat()]));
        assert!(v.labels().contains(&Label::new("s", [Sort::nat()])));
    }

    #[test]
    fn test_participants() {
        let v = example();
        let e = &v.entries()[2];
        assert_eq!(e.participants().collect::<Vec<_>>(), vec![0, 1]);
        assert!(e.others_active(1));
        assert!(!v.entries()[1].others_active(1));
    }

    #[test]
    fn test_save_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("v.sync");
        let v = example();
        v.save(&path).unwrap();
        assert_eq!(SyncVector::load(&path).unwrap(), v);
        let missing = dir.path().join("missing.sync");
        assert!(matches!(SyncVector::load(&missing), Err(Error::Io { .. })));
    }
}
