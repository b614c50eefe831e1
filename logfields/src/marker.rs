//! Named markers and the reference graph between them.
//!
//! A [`Marker`] is a named attachment to a log call. Markers can reference other markers,
//! and the field-emitting kinds ([`MarkerKind::Field`], [`MarkerKind::Entries`]) additionally
//! write themselves into the structured document and render themselves into text.
//!
//! # Identity
//!
//! Markers are identified by name: two plain markers with the same name are equal and hash
//! alike whatever their references. Field markers additionally compare their field name and
//! entries markers their mapping. Callers wanting distinguishable markers must vary the name.
//!
//! # References
//!
//! Markers are typically built once and shared between threads. The reference list is an
//! immutable snapshot swapped atomically on every change, so iteration never blocks and
//! never observes a half-applied update.
//!
//! Adding a reference is guarded against the simplest cycles only: a marker never references
//! itself, and never references a marker that already directly references it. Longer cycles
//! (`a -> b -> c -> a`) are accepted.

use core::fmt;
use core::hash::{Hash, Hasher};
use std::sync::Arc;

use arc_swap::ArcSwap;
use rustc_hash::FxHashSet;

use crate::field::{FieldEmitter, MapEntries, SingleField};
use crate::render::Renderer;

/// Prefix shared by the names of all built-in markers.
pub const MARKER_NAME_PREFIX: &str = "LS_";

/// What a marker does besides being named.
#[derive(Clone, Debug, PartialEq)]
pub enum MarkerKind {
    /// Only a name and references.
    Plain,
    /// Appends a single field.
    Field(SingleField),
    /// Appends one field per mapping entry.
    Entries(MapEntries),
}

/// A named node in the marker reference graph.
///
/// # Examples
///
/// ```rust
/// use std::sync::Arc;
///
/// use logfields::marker::Marker;
///
/// let audit = Arc::new(Marker::new("AUDIT"));
/// let security = Marker::new("SECURITY");
/// security.add(audit.clone());
///
/// assert!(security.contains(&audit));
/// assert!(security.contains_name("AUDIT"));
/// assert_eq!(security.to_string(), "SECURITY [AUDIT]");
/// ```
pub struct Marker {
    name: String,
    kind: MarkerKind,
    references: ArcSwap<Vec<Arc<Marker>>>,
}

impl Marker {
    /// Creates a plain marker.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_kind(name, MarkerKind::Plain)
    }

    /// Creates a marker of the given kind.
    pub fn with_kind(name: impl Into<String>, kind: MarkerKind) -> Self {
        Self {
            name: name.into(),
            kind,
            references: ArcSwap::from_pointee(Vec::new()),
        }
    }

    /// The marker's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The marker's kind.
    pub fn kind(&self) -> &MarkerKind {
        &self.kind
    }

    /// The field-emitting behaviour of this marker, if it has any.
    pub fn field_emitter(&self) -> Option<&dyn FieldEmitter> {
        match &self.kind {
            MarkerKind::Plain => None,
            MarkerKind::Field(field) => Some(field),
            MarkerKind::Entries(entries) => Some(entries),
        }
    }

    /// Adds `reference` unless it is already present, is this marker, or already directly
    /// references this marker.
    pub fn add(&self, reference: Arc<Marker>) {
        if self.contains(&reference) || reference.contains(self) {
            return;
        }

        // Re-checked inside the update, a concurrent `add` may have won the race.
        self.references.rcu(|current| {
            if current.iter().any(|existing| **existing == *reference) {
                Arc::clone(current)
            } else {
                let mut next = Vec::clone(current);
                next.push(Arc::clone(&reference));
                Arc::new(next)
            }
        });
    }

    /// Removes the first reference equal to `reference`, returning whether one was removed.
    pub fn remove(&self, reference: &Marker) -> bool {
        let mut removed = false;
        self.references.rcu(|current| {
            match current.iter().position(|existing| **existing == *reference) {
                Some(index) => {
                    removed = true;
                    let mut next = Vec::clone(current);
                    next.remove(index);
                    Arc::new(next)
                }
                None => {
                    removed = false;
                    Arc::clone(current)
                }
            }
        });
        removed
    }

    /// Whether this marker has any references.
    pub fn has_references(&self) -> bool {
        !self.references.load().is_empty()
    }

    /// A snapshot of the current references, unaffected by later changes.
    pub fn references(&self) -> Arc<Vec<Arc<Marker>>> {
        self.references.load_full()
    }

    /// Whether `other` is this marker or one of its direct references.
    ///
    /// Unlike [`Marker::contains_name`] this does not look further than direct references.
    pub fn contains(&self, other: &Marker) -> bool {
        self == other
            || self
                .references
                .load()
                .iter()
                .any(|reference| **reference == *other)
    }

    /// Whether this marker, or any marker reachable through references, is named `name`.
    pub fn contains_name(&self, name: &str) -> bool {
        self.contains_name_visiting(name, &mut FxHashSet::default())
    }

    fn contains_name_visiting(&self, name: &str, visited: &mut FxHashSet<*const Marker>) -> bool {
        if self.name == name {
            return true;
        }

        // Longer cycles are allowed, stop at nodes that were already searched.
        if !visited.insert(core::ptr::from_ref(self)) {
            return false;
        }

        self.references
            .load()
            .iter()
            .any(|reference| reference.contains_name_visiting(name, visited))
    }

    /// Renders the marker for a log line.
    ///
    /// A marker with references renders as `name [first, second]` using the references'
    /// names only. Without references it renders as [`Marker::to_string_self`].
    pub fn render(&self, renderer: &mut Renderer) -> String {
        let references = self.references.load();
        if references.is_empty() {
            return self.to_string_self(renderer);
        }

        let mut output = String::with_capacity(self.name.len() + 16 * references.len());
        output.push_str(&self.name);
        output.push_str(" [");
        for (index, reference) in references.iter().enumerate() {
            if index > 0 {
                output.push_str(", ");
            }
            output.push_str(&reference.name);
        }
        output.push(']');
        output
    }

    /// Renders only this marker, ignoring references: the name for a plain marker and the
    /// field text for field-emitting markers.
    pub fn to_string_self(&self, renderer: &mut Renderer) -> String {
        match self.field_emitter() {
            Some(emitter) => emitter.to_string_self(renderer),
            None => self.name.clone(),
        }
    }
}

// Symmetric: a plain marker never equals a field or entries marker of the same name, so
// adding a field marker to a plain marker named like it inserts a reference.
impl PartialEq for Marker {
    fn eq(&self, other: &Self) -> bool {
        if self.name != other.name {
            return false;
        }

        match (&self.kind, &other.kind) {
            (MarkerKind::Plain, MarkerKind::Plain) => true,
            (MarkerKind::Field(a), MarkerKind::Field(b)) => a.field_name() == b.field_name(),
            (MarkerKind::Entries(a), MarkerKind::Entries(b)) => a.map() == b.map(),
            _ => false,
        }
    }
}

impl Hash for Marker {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl fmt::Debug for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // References are listed by name, the graph may contain cycles.
        let references = self.references.load();
        f.debug_struct("Marker")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field(
                "references",
                &references
                    .iter()
                    .map(|reference| reference.name())
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}

/// Renders with a throwaway [`Renderer`]; prefer [`Marker::render`] with the worker's
/// renderer on hot paths so custom patterns stay compiled.
impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(&mut Renderer::new()))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};
    use std::sync::Arc;

    use pretty_assertions::assert_eq;

    use super::Marker;
    use crate::structured::{APPEND_OBJECT_MARKER_NAME, entries, key_value, value};
    use crate::value::Map;

    fn hash_of(marker: &Marker) -> u64 {
        let mut hasher = DefaultHasher::new();
        marker.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn adding_self_is_a_noop() {
        let marker = Arc::new(Marker::new("A"));
        marker.add(marker.clone());
        assert!(!marker.has_references());
    }

    #[test]
    fn adding_equal_marker_is_a_noop() {
        let marker = Marker::new("A");
        marker.add(Arc::new(Marker::new("A")));
        assert!(!marker.has_references());
    }

    #[test]
    fn duplicates_are_ignored() {
        let a = Marker::new("A");
        let b = Arc::new(Marker::new("B"));
        a.add(b.clone());
        a.add(Arc::new(Marker::new("B")));
        assert_eq!(a.references().len(), 1);
    }

    #[test]
    fn two_cycles_are_prevented() {
        let a = Arc::new(Marker::new("A"));
        let b = Arc::new(Marker::new("B"));

        b.add(a.clone());
        a.add(b.clone());

        assert!(b.contains(&a));
        assert!(!a.has_references());
    }

    #[test]
    fn longer_cycles_are_not_prevented() {
        let a = Arc::new(Marker::new("A"));
        let b = Arc::new(Marker::new("B"));
        let c = Arc::new(Marker::new("C"));

        a.add(b.clone());
        b.add(c.clone());
        c.add(a.clone());

        assert!(c.contains(&a));
        assert!(a.contains_name("C"));
        assert!(!a.contains_name("D"));
    }

    #[test]
    fn contains_marker_is_not_transitive() {
        let a = Marker::new("A");
        let b = Arc::new(Marker::new("B"));
        let c = Arc::new(Marker::new("C"));
        b.add(c.clone());
        a.add(b.clone());

        assert!(a.contains(&a));
        assert!(a.contains(&b));
        assert!(!a.contains(&c));
        assert!(a.contains_name("C"));
    }

    #[test]
    fn remove_reports_whether_anything_was_removed() {
        let a = Marker::new("A");
        let b = Arc::new(Marker::new("B"));
        a.add(b.clone());

        assert!(a.remove(&Marker::new("B")));
        assert!(!a.remove(&b));
        assert!(!a.has_references());
    }

    #[test]
    fn snapshots_are_isolated_from_changes() {
        let a = Marker::new("A");
        a.add(Arc::new(Marker::new("B")));

        let snapshot = a.references();
        a.add(Arc::new(Marker::new("C")));
        a.remove(&Marker::new("B"));

        let names: Vec<_> = snapshot.iter().map(|marker| marker.name()).collect();
        assert_eq!(names, ["B"]);
        assert_eq!(a.references().len(), 1);
    }

    #[test]
    fn equality_and_hash_use_the_name() {
        let left = Marker::new("SAME");
        let right = Marker::new("SAME");
        left.add(Arc::new(Marker::new("X")));

        assert_eq!(left, right);
        assert_eq!(hash_of(&left), hash_of(&right));
        assert_ne!(left, Marker::new("OTHER"));
    }

    #[test]
    fn field_markers_also_compare_field_names() {
        assert_eq!(key_value("k", 1), key_value("k", 2));
        assert_eq!(key_value("k", 1), value("k", 1));
        assert_ne!(key_value("k", 1), key_value("j", 1));
        assert_eq!(hash_of(&key_value("k", 1)), hash_of(&key_value("j", 1)));
    }

    #[test]
    fn kinds_never_compare_equal() {
        let plain = Marker::new(APPEND_OBJECT_MARKER_NAME);
        let field = Arc::new(key_value("k", 1));

        assert_ne!(plain, *field);
        assert_ne!(*field, plain);
        assert_eq!(hash_of(&plain), hash_of(&field));

        plain.add(field.clone());
        assert!(plain.contains(&field));
        assert_eq!(plain.references().len(), 1);
    }

    #[test]
    fn entries_markers_compare_mappings() {
        let map: Map = [("a", 1)].into_iter().collect();
        assert_eq!(entries(map.clone()), entries(map.clone()));
        assert_ne!(entries(map), entries(Map::new()));
    }

    #[test]
    fn renders_reference_names() {
        let a = Marker::new("A");
        assert_eq!(a.to_string(), "A");

        let b = Arc::new(Marker::new("B"));
        b.add(Arc::new(Marker::new("D")));
        a.add(b);
        a.add(Arc::new(Marker::new("C")));
        assert_eq!(a.to_string(), "A [B, C]");
    }

    #[test]
    fn field_marker_with_references_renders_its_name() {
        let marker = key_value("k", 5);
        assert_eq!(marker.to_string(), "k=5");

        marker.add(Arc::new(Marker::new("AUDIT")));
        assert_eq!(marker.to_string(), "LS_APPEND_OBJECT [AUDIT]");
    }

    #[test]
    fn shared_markers_survive_concurrent_updates() {
        let root = Arc::new(Marker::new("ROOT"));

        let handles: Vec<_> = (0..8)
            .map(|worker| {
                let root = root.clone();
                std::thread::spawn(move || {
                    let child = Arc::new(Marker::new(format!("CHILD-{worker}")));
                    for _ in 0..100 {
                        root.add(child.clone());
                        let _ = root.to_string();
                        root.remove(&child);
                    }
                    root.add(child);
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(root.references().len(), 8);
        assert!(root.contains_name("CHILD-7"));
    }
}
