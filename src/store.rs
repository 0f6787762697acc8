//! In-memory note store.
//!
//! The store holds the session's notes keyed by id, in insertion order,
//! together with the staging slot the editor and print screens work from.
//! Every operation is total: inserts replace, removals of unknown ids
//! report a no-op, lookups return options.

use indexmap::IndexMap;
use log::{debug, trace};

use crate::Note;

/// Ordered, id-keyed collection of notes plus the staging slot.
#[derive(Debug)]
pub struct NoteStore {
    /// Notes keyed by id, in insertion order
    notes: IndexMap<String, Note>,

    /// The note staged for editing or printing
    current: Option<Note>,

    /// Next candidate handed out by `mint_id`
    next_id: u64,
}

impl Default for NoteStore {
    fn default() -> Self {
        Self::new()
    }
}

impl NoteStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            notes: IndexMap::new(),
            current: None,
            next_id: 1,
        }
    }

    /// Hands out the next unused numeric id. Ids already occupied, for
    /// example after `replace_all` seeded the collection, are skipped.
    pub fn mint_id(&mut self) -> String {
        loop {
            let candidate = self.next_id.to_string();
            self.next_id += 1;
            if !self.notes.contains_key(&candidate) {
                trace!("Minted note id {}", candidate);
                return candidate;
            }
        }
    }

    /// Inserts the note, replacing any stored note with the same id.
    /// A replaced note keeps its position in the ordering; a new id is
    /// appended at the end.
    pub fn upsert(&mut self, note: Note) {
        let id = note.id.clone();
        if self.notes.insert(id.clone(), note).is_some() {
            debug!("Replaced note {} in place", id);
        } else {
            debug!("Added note {}", id);
        }
    }

    /// Removes the note with the given id, keeping the order of the rest.
    /// Returns whether a note was actually removed; an unknown id is a
    /// no-op.
    pub fn remove(&mut self, id: &str) -> bool {
        match self.notes.shift_remove(id) {
            Some(_) => {
                debug!("Removed note {}", id);
                true
            }
            None => {
                debug!("Remove of unknown note {} ignored", id);
                false
            }
        }
    }

    /// Flips the favorite flag on a stored note. The stored note is never
    /// mutated in place: a toggled copy replaces it through `upsert`, so a
    /// staged clone of the same note stays untouched. Returns the new flag
    /// value, or `None` for an unknown id.
    pub fn toggle_favorite(&mut self, id: &str) -> Option<bool> {
        let updated = match self.notes.get(id) {
            Some(note) => {
                let mut copy = note.clone();
                copy.favorite = !copy.favorite;
                copy
            }
            None => {
                debug!("Favorite toggle for unknown note {} ignored", id);
                return None;
            }
        };

        let flag = updated.favorite;
        debug!("Note {} favorite -> {}", id, flag);
        self.upsert(updated);
        Some(flag)
    }

    /// Replaces the whole collection. A later duplicate of an id wins.
    pub fn replace_all<I>(&mut self, notes: I)
    where
        I: IntoIterator<Item = Note>,
    {
        self.notes = notes.into_iter().map(|n| (n.id.clone(), n)).collect();
        debug!("Replaced note collection, now {} notes", self.notes.len());
    }

    /// Stages a note for the editor and print screens, or clears the slot.
    pub fn set_current(&mut self, note: Option<Note>) {
        match &note {
            Some(n) => trace!("Staged note {}", n.id),
            None => trace!("Cleared staged note"),
        }
        self.current = note;
    }

    /// The note currently staged, if any.
    pub fn current(&self) -> Option<&Note> {
        self.current.as_ref()
    }

    /// Looks up a note by id.
    pub fn get(&self, id: &str) -> Option<&Note> {
        self.notes.get(id)
    }

    /// All notes in insertion order.
    pub fn notes(&self) -> impl Iterator<Item = &Note> {
        self.notes.values()
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn sample(id: &str, title: &str) -> Note {
        Note::new(
            id.to_string(),
            title.to_string(),
            format!("content of {}", title),
        )
    }

    fn ids(store: &NoteStore) -> Vec<&str> {
        store.notes().map(|note| note.id.as_str()).collect()
    }

    #[test]
    fn upsert_appends_new_ids_in_order() {
        let mut store = NoteStore::new();
        store.upsert(sample("1", "uno"));
        store.upsert(sample("2", "dos"));
        store.upsert(sample("3", "tres"));

        assert_eq!(ids(&store), ["1", "2", "3"]);
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn upsert_replaces_an_existing_note_in_place() {
        let mut store = NoteStore::new();
        store.upsert(sample("1", "uno"));
        store.upsert(sample("2", "dos"));
        store.upsert(sample("3", "tres"));

        store.upsert(sample("2", "dos renamed"));

        assert_eq!(store.len(), 3);
        assert_eq!(ids(&store), ["1", "2", "3"]);
        assert_eq!(store.get("2").unwrap().title, "dos renamed");
    }

    #[test]
    fn remove_keeps_the_order_of_the_rest() {
        let mut store = NoteStore::new();
        store.upsert(sample("1", "uno"));
        store.upsert(sample("2", "dos"));
        store.upsert(sample("3", "tres"));

        assert!(store.remove("2"));
        assert_eq!(ids(&store), ["1", "3"]);
    }

    #[test]
    fn remove_of_an_unknown_id_is_a_no_op() {
        let mut store = NoteStore::new();
        store.upsert(sample("1", "uno"));

        assert!(!store.remove("9"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn favorite_toggle_replaces_a_copy_and_leaves_the_staged_note_alone() {
        let mut store = NoteStore::new();
        store.upsert(sample("1", "uno"));
        let staged = store.get("1").unwrap().clone();
        store.set_current(Some(staged));

        assert_eq!(store.toggle_favorite("1"), Some(true));
        assert!(store.get("1").unwrap().favorite);
        assert!(!store.current().unwrap().favorite);

        assert_eq!(store.toggle_favorite("1"), Some(false));
        assert!(!store.get("1").unwrap().favorite);
    }

    #[test]
    fn favorite_toggle_of_an_unknown_id_reports() {
        let mut store = NoteStore::new();
        assert_eq!(store.toggle_favorite("9"), None);
    }

    #[test]
    fn replace_all_swaps_the_collection_but_not_the_staged_note() {
        let mut store = NoteStore::new();
        store.upsert(sample("1", "uno"));
        store.upsert(sample("2", "dos"));
        store.set_current(Some(sample("1", "uno")));

        store.replace_all(vec![sample("7", "siete")]);

        assert_eq!(ids(&store), ["7"]);
        assert_eq!(store.get("1"), None);
        assert_eq!(store.current().unwrap().id, "1");
    }

    #[test]
    fn mint_id_counts_up_and_skips_occupied_ids() {
        let mut store = NoteStore::new();
        assert_eq!(store.mint_id(), "1");
        assert_eq!(store.mint_id(), "2");

        let mut seeded = NoteStore::new();
        seeded.replace_all(vec![sample("1", "uno"), sample("3", "tres")]);
        assert_eq!(seeded.mint_id(), "2");
        assert_eq!(seeded.mint_id(), "4");
    }
}
