use chrono::Local;

use super::data::{Capture, CaptureId, CaptureUpdate, NewCapture, DEFAULT_TAGS};

/// The Library is the in-memory capture collection.
///
/// It is the sole owner of capture mutation: views read snapshots and
/// dispatch messages, the app calls these mutators. Captures are kept
/// most-recent-first. The selection is stored as an id and resolved against
/// the live collection, so a selected capture always reflects the latest
/// update and disappears when deleted.
#[derive(Debug, Default)]
pub struct Library {
    captures: Vec<Capture>,
    selected: Option<CaptureId>,
    query: String,
    next_id: u64,
}

impl Library {
    /// Create an empty library
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a count of captures in the library
    pub fn capture_count(&self) -> usize {
        self.captures.len()
    }

    /// All captures, newest first
    pub fn captures(&self) -> &[Capture] {
        &self.captures
    }

    pub fn get(&self, id: CaptureId) -> Option<&Capture> {
        self.captures.iter().find(|capture| capture.id == id)
    }

    /// Add a prepared capture to the front of the library and select it.
    /// Returns the fresh id.
    pub fn add_capture(&mut self, new: NewCapture) -> CaptureId {
        self.next_id += 1;
        let id = CaptureId(self.next_id);

        let capture = Capture {
            id,
            name: new.name,
            src: new.src,
            kind: new.kind,
            tags: DEFAULT_TAGS.iter().map(|tag| tag.to_string()).collect(),
            file: new.file,
            created_at: Local::now(),
        };

        tracing::info!(%id, name = %capture.name, kind = ?capture.kind, "capture added");

        self.captures.insert(0, capture);
        self.selected = Some(id);
        id
    }

    /// Select an existing capture. Returns false if the id is unknown.
    pub fn select(&mut self, id: CaptureId) -> bool {
        if self.get(id).is_none() {
            return false;
        }
        self.selected = Some(id);
        true
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// The currently selected capture, as it is now
    pub fn selected(&self) -> Option<&Capture> {
        self.selected.and_then(|id| self.get(id))
    }

    pub fn selected_id(&self) -> Option<CaptureId> {
        self.selected().map(|capture| capture.id)
    }

    /// Remove a capture, clearing the selection if it pointed at it.
    /// Unknown ids are ignored.
    pub fn delete_capture(&mut self, id: CaptureId) -> Option<Capture> {
        let index = self.captures.iter().position(|capture| capture.id == id)?;
        let removed = self.captures.remove(index);

        if self.selected == Some(id) {
            self.selected = None;
        }

        tracing::info!(%id, name = %removed.name, "capture deleted");
        Some(removed)
    }

    /// Merge a partial update into a capture. Returns false if the id is unknown.
    pub fn update_capture(&mut self, id: CaptureId, update: CaptureUpdate) -> bool {
        let Some(capture) = self.captures.iter_mut().find(|capture| capture.id == id) else {
            tracing::debug!(%id, "update for unknown capture ignored");
            return false;
        };
        if update.is_empty() {
            return true;
        }

        tracing::info!(
            %id,
            name = update.name.is_some(),
            src = update.src.is_some(),
            tags = update.tags.is_some(),
            file = update.file.is_some(),
            "capture updated"
        );

        capture.apply(update);
        true
    }

    /// Add a tag unless it is blank or already present (case-insensitive)
    pub fn add_tag(&mut self, id: CaptureId, tag: &str) -> bool {
        let tag = tag.trim();
        let Some(capture) = self.get(id) else {
            return false;
        };
        if tag.is_empty() || capture.tags.iter().any(|t| t.eq_ignore_ascii_case(tag)) {
            return false;
        }

        let mut tags = capture.tags.clone();
        tags.push(tag.to_string());
        self.update_capture(id, CaptureUpdate::tags(tags))
    }

    pub fn remove_tag(&mut self, id: CaptureId, tag: &str) -> bool {
        let Some(capture) = self.get(id) else {
            return false;
        };
        if !capture.tags.iter().any(|t| t == tag) {
            return false;
        }

        let tags = capture.tags.iter().filter(|t| *t != tag).cloned().collect();
        self.update_capture(id, CaptureUpdate::tags(tags))
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    /// Captures matching the active search query, in library order
    pub fn visible(&self) -> Vec<&Capture> {
        filter(self.captures(), &self.query)
    }
}

/// Captures visible under `query`: all of them for an empty query,
/// otherwise those whose name or any tag contains it (case-insensitive).
pub fn filter<'a>(captures: &'a [Capture], query: &str) -> Vec<&'a Capture> {
    captures.iter().filter(|capture| capture.matches(query)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::data::{CaptureKind, SourceFile};
    use pretty_assertions::assert_eq;
    use std::collections::HashSet;
    use std::path::PathBuf;

    fn new_capture(name: &str) -> NewCapture {
        NewCapture {
            name: name.to_string(),
            src: "data:image/png;base64,aGVsbG8=".to_string(),
            kind: CaptureKind::Image,
            file: Some(SourceFile {
                path: PathBuf::from(format!("/tmp/{}", name)),
                mime: "image/png".to_string(),
                size: 5,
            }),
        }
    }

    fn library_with(names: &[&str]) -> (Library, Vec<CaptureId>) {
        let mut library = Library::new();
        let ids = names.iter().map(|name| library.add_capture(new_capture(name))).collect();
        (library, ids)
    }

    #[test]
    fn test_add_prepends_selects_and_tags() {
        let (library, ids) = library_with(&["first.png", "second.png"]);

        assert_eq!(library.capture_count(), 2);
        assert_eq!(library.captures()[0].name, "second.png");
        assert_eq!(library.captures()[1].name, "first.png");
        assert_eq!(library.selected_id(), Some(ids[1]));
        assert_eq!(library.captures()[0].tags, vec!["new", "capture"]);
    }

    #[test]
    fn test_ids_are_unique_even_after_delete() {
        let (mut library, ids) = library_with(&["a.png", "b.png", "c.png"]);
        library.delete_capture(ids[2]);
        let fresh = library.add_capture(new_capture("d.png"));

        let mut seen: HashSet<CaptureId> = ids.iter().copied().collect();
        assert!(seen.insert(fresh), "id {fresh} was reused");
        assert_eq!(library.selected_id(), Some(fresh));
    }

    #[test]
    fn test_delete_clears_selection_of_deleted() {
        let (mut library, ids) = library_with(&["a.png", "b.png"]);
        assert_eq!(library.selected_id(), Some(ids[1]));

        let removed = library.delete_capture(ids[1]).unwrap();
        assert_eq!(removed.id, ids[1]);
        assert_eq!(library.selected(), None);
        assert!(library.get(ids[1]).is_none());
        assert!(!library.select(ids[1]));
        assert!(library.captures().iter().all(|c| c.id != ids[1]));
    }

    #[test]
    fn test_delete_keeps_other_selection() {
        let (mut library, ids) = library_with(&["a.png", "b.png"]);
        library.select(ids[0]);
        library.delete_capture(ids[1]);
        assert_eq!(library.selected_id(), Some(ids[0]));
    }

    #[test]
    fn test_delete_unknown_is_noop() {
        let (mut library, ids) = library_with(&["a.png"]);
        library.delete_capture(ids[0]);

        assert!(library.delete_capture(ids[0]).is_none());
        assert!(library.delete_capture(CaptureId(999)).is_none());
        assert_eq!(library.capture_count(), 0);
    }

    #[test]
    fn test_update_merges_and_selection_sees_it() {
        let (mut library, ids) = library_with(&["a.png"]);
        let before = library.get(ids[0]).unwrap().clone();

        assert!(library.update_capture(ids[0], CaptureUpdate::name("renamed.png")));

        let after = library.selected().unwrap();
        assert_eq!(
            after,
            &Capture {
                name: "renamed.png".to_string(),
                ..before
            }
        );
    }

    #[test]
    fn test_update_unknown_returns_false() {
        let mut library = Library::new();
        assert!(!library.update_capture(CaptureId(1), CaptureUpdate::name("x")));
    }

    #[test]
    fn test_redaction_round_trip() {
        let (mut library, ids) = library_with(&["secret.png"]);
        let before = library.get(ids[0]).unwrap().clone();

        library.update_capture(ids[0], CaptureUpdate::redacted("data:image/png;base64,Ynll".to_string()));

        let after = library.get(ids[0]).unwrap();
        assert_eq!(after.src, "data:image/png;base64,Ynll");
        assert_eq!(after.file, None);
        assert_eq!(
            (after.id, &after.name, after.kind, &after.tags),
            (before.id, &before.name, before.kind, &before.tags)
        );
    }

    #[test]
    fn test_tags_add_and_remove() {
        let (mut library, ids) = library_with(&["a.png"]);

        assert!(library.add_tag(ids[0], " invoice "));
        assert!(!library.add_tag(ids[0], "INVOICE"));
        assert!(!library.add_tag(ids[0], "   "));
        assert_eq!(library.get(ids[0]).unwrap().tags, vec!["new", "capture", "invoice"]);

        assert!(library.remove_tag(ids[0], "new"));
        assert!(!library.remove_tag(ids[0], "missing"));
        assert_eq!(library.get(ids[0]).unwrap().tags, vec!["capture", "invoice"]);
    }

    #[test]
    fn test_filter_empty_query_returns_all_in_order() {
        let (library, _) = library_with(&["a.png", "b.png", "c.png"]);
        let all: Vec<&str> = filter(library.captures(), "").iter().map(|c| c.name.as_str()).collect();
        assert_eq!(all, vec!["c.png", "b.png", "a.png"]);
    }

    #[test]
    fn test_filter_on_name_or_tag() {
        let (mut library, ids) = library_with(&["Login Screen.png", "chart.png"]);
        library.add_tag(ids[1], "Analytics");

        library.set_query("LOGIN");
        let names: Vec<&str> = library.visible().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Login Screen.png"]);

        library.set_query("analytics");
        let names: Vec<&str> = library.visible().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["chart.png"]);

        library.set_query("capture");
        assert_eq!(library.visible().len(), 2);

        library.set_query("nothing");
        assert!(library.visible().is_empty());
    }

    #[test]
    fn test_filter_does_not_trim_query() {
        let (mut library, _) = library_with(&["ab.png", "ba.png"]);

        library.set_query("   ");
        assert!(library.visible().is_empty());

        library.set_query(" a");
        assert!(library.visible().is_empty());

        library.set_query("b.");
        let names: Vec<&str> = library.visible().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["ab.png"]);
    }
}
