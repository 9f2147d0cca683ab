use uuid::Uuid;

use crate::types::{ItemUpdate, StoryboardItem};

/// Ordered storyboard for one session. Items are never removed one by one:
/// the collection is either replaced whole or cleared.
#[derive(Debug, Default, Clone)]
pub struct StoryboardStore {
    items: Vec<StoryboardItem>,
}

impl StoryboardStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[StoryboardItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: Uuid) -> Option<&StoryboardItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// 1-based position, as shown on slides.
    pub fn nth(&self, number: usize) -> Option<&StoryboardItem> {
        number.checked_sub(1).and_then(|i| self.items.get(i))
    }

    /// Apply `update` to the item with `id`. Returns whether an item matched;
    /// an unknown id leaves the store untouched.
    pub fn update(&mut self, id: Uuid, update: &ItemUpdate) -> bool {
        match self.items.iter_mut().find(|item| item.id == id) {
            Some(item) => {
                update.apply(item);
                true
            }
            None => false,
        }
    }

    pub fn replace_all(&mut self, items: Vec<StoryboardItem>) {
        self.items = items;
    }

    pub fn reset(&mut self) {
        self.items.clear();
    }

    /// Owned copy for readers that must not observe later edits.
    pub fn snapshot(&self) -> Vec<StoryboardItem> {
        self.items.clone()
    }
}
