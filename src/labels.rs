//! Fresh action labels with memoized reuse.

use std::collections::HashMap;

use log::debug;

use crate::action::Label;
use crate::ident::IdentifierGenerator;
use crate::vector::Tag;

/// Allocates fresh action labels for synchronization patterns.
///
/// The generator is seeded with every identifier already in use. Requests are
/// memoized on `(tags, label)`: asking twice for the same pattern returns the
/// same fresh label, so the vector quotient and the formula quotient of one
/// run agree on the residual actions.
#[derive(Debug, Clone, Default)]
pub struct LabelGenerator {
    ids: IdentifierGenerator,
    memo: HashMap<(Vec<Tag>, Label), Label>,
    generated: Vec<Label>,
}

impl LabelGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_identifier(&mut self, id: impl Into<String>) {
        self.ids.add_identifier(id);
    }

    pub fn add_identifiers<S: Into<String>>(&mut self, ids: impl IntoIterator<Item = S>) {
        self.ids.add_identifiers(ids);
    }

    /// Returns the fresh label for the pattern `(tags, label)`, creating it on
    /// first request. The fresh label keeps the sorts of `label`.
    pub fn fresh_label(&mut self, tags: &[Tag], label: &Label) -> Label {
        let key = (tags.to_vec(), label.clone());
        if let Some(fresh) = self.memo.get(&key) {
            return fresh.clone();
        }
        let name = self.ids.fresh(label.name());
        let fresh = Label::new(name, label.sorts().iter().cloned());
        debug!("fresh label {} for {:?} -> {}", fresh, tags, label);
        self.memo.insert(key, fresh.clone());
        self.generated.push(fresh.clone());
        fresh
    }

    /// All labels generated so far, in order of creation.
    pub fn generated(&self) -> &[Label] {
        &self.generated
    }
}
