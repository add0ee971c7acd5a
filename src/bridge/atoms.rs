//! Symbolic store entities
//!
//! Atoms are the unit of the symbolic side: a kind, an optional name, and an
//! optional truth value. Stores keep them in insertion order, and that order
//! is the slot order used by every tensor conversion.

use crate::CognitiveError;
use serde::{Deserialize, Serialize};

/// Default capacity of an [`AtomSpace`]
pub const DEFAULT_STORE_CAPACITY: usize = 1000;

/// Kind of atom
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AtomType {
    Concept,
    Link,
    Inheritance,
}

/// Strength and confidence of an atom
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TruthValue {
    /// Strength in `[0, 1]` for well-formed values
    pub mean: f64,
    /// Confidence in `[0, 1]` for well-formed values
    pub confidence: f64,
}

impl TruthValue {
    pub fn new(mean: f64, confidence: f64) -> Self {
        Self { mean, confidence }
    }
}

/// One symbolic atom
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Atom {
    pub kind: AtomType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub truth: Option<TruthValue>,
}

impl Atom {
    pub fn new(kind: AtomType) -> Self {
        Self {
            kind,
            name: None,
            truth: None,
        }
    }

    /// Named concept with a truth value
    pub fn concept(name: impl Into<String>, mean: f64, confidence: f64) -> Self {
        Self::new(AtomType::Concept)
            .with_name(name)
            .with_truth(TruthValue::new(mean, confidence))
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_truth(mut self, truth: TruthValue) -> Self {
        self.truth = Some(truth);
        self
    }

    /// Truth mean, if any
    pub fn mean(&self) -> Option<f64> {
        self.truth.map(|t| t.mean)
    }
}

/// Ordered, bounded collection of atoms
///
/// Implement this to feed an external knowledge base into the bridge
/// operations. [`AtomSpace`] is the in-memory implementation.
pub trait KnowledgeStore {
    /// Atoms in slot order
    fn atoms(&self) -> &[Atom];

    /// Maximum number of atoms the store accepts
    fn capacity(&self) -> usize;

    /// Append `atom`; returns `false` and drops it when the store is full
    fn push(&mut self, atom: Atom) -> bool;

    /// Remove every atom
    fn clear(&mut self);

    fn len(&self) -> usize {
        self.atoms().len()
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn is_full(&self) -> bool {
        self.len() >= self.capacity()
    }
}

/// In-memory atom store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "AtomSpaceSnapshot")]
pub struct AtomSpace {
    atoms: Vec<Atom>,
    capacity: usize,
}

#[derive(Deserialize)]
struct AtomSpaceSnapshot {
    atoms: Vec<Atom>,
    capacity: usize,
}

impl TryFrom<AtomSpaceSnapshot> for AtomSpace {
    type Error = CognitiveError;

    fn try_from(snapshot: AtomSpaceSnapshot) -> Result<Self, Self::Error> {
        if snapshot.atoms.len() > snapshot.capacity {
            return Err(CognitiveError::InvalidArgument(format!(
                "snapshot holds {} atoms but its capacity is {}",
                snapshot.atoms.len(),
                snapshot.capacity
            )));
        }
        Ok(Self {
            atoms: snapshot.atoms,
            capacity: snapshot.capacity,
        })
    }
}

impl AtomSpace {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_STORE_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            atoms: Vec::new(),
            capacity,
        }
    }

    /// Fill from an iterator, stopping silently at capacity
    pub fn from_atoms(atoms: impl IntoIterator<Item = Atom>) -> Self {
        let mut space = Self::new();
        for atom in atoms {
            if !space.push(atom) {
                break;
            }
        }
        space
    }

    /// First atom whose name equals `name`
    pub fn find(&self, name: &str) -> Option<&Atom> {
        self.atoms.iter().find(|a| a.name.as_deref() == Some(name))
    }
}

impl Default for AtomSpace {
    fn default() -> Self {
        Self::new()
    }
}

impl KnowledgeStore for AtomSpace {
    fn atoms(&self) -> &[Atom] {
        &self.atoms
    }

    fn capacity(&self) -> usize {
        self.capacity
    }

    fn push(&mut self, atom: Atom) -> bool {
        if self.atoms.len() >= self.capacity {
            return false;
        }
        self.atoms.push(atom);
        true
    }

    fn clear(&mut self) {
        self.atoms.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_respects_capacity() {
        let mut space = AtomSpace::with_capacity(2);
        assert!(space.push(Atom::new(AtomType::Link)));
        assert!(space.push(Atom::concept("a", 0.5, 0.9)));
        assert!(space.is_full());
        assert!(!space.push(Atom::new(AtomType::Concept)));
        assert_eq!(space.len(), 2);

        space.clear();
        assert!(space.is_empty());
    }

    #[test]
    fn test_default_capacity() {
        let space = AtomSpace::default();
        assert_eq!(space.capacity(), DEFAULT_STORE_CAPACITY);
        assert_eq!(space.capacity(), 1000);
    }

    #[test]
    fn test_from_atoms_truncates() {
        let space = AtomSpace::from_atoms((0..1200).map(|i| Atom::concept(format!("c{}", i), 0.1, 0.1)));
        assert_eq!(space.len(), 1000);
        assert!(space.find("c999").is_some());
        assert!(space.find("c1000").is_none());
    }

    #[test]
    fn test_atom_builders() {
        let atom = Atom::new(AtomType::Inheritance).with_name("is-a");
        assert_eq!(atom.mean(), None);
        let atom = atom.with_truth(TruthValue::new(0.7, 0.3));
        assert_eq!(atom.mean(), Some(0.7));
        assert_eq!(atom.name.as_deref(), Some("is-a"));
    }

    #[test]
    fn test_serde_roundtrip() {
        let space = AtomSpace::from_atoms([Atom::concept("cat", 0.9, 0.8), Atom::new(AtomType::Link)]);
        let json = serde_json::to_string(&space).unwrap();
        assert!(json.contains("\"concept\""));
        let parsed: AtomSpace = serde_json::from_str(&json).unwrap();
        assert_eq!(space, parsed);
    }

    #[test]
    fn test_deserialize_rejects_overfull_store() {
        let json = r#"{"atoms":[{"kind":"concept"},{"kind":"link"}],"capacity":1}"#;
        assert!(serde_json::from_str::<AtomSpace>(json).is_err());

        let json = r#"{"atoms":[{"kind":"concept"}],"capacity":1}"#;
        let space: AtomSpace = serde_json::from_str(json).unwrap();
        assert!(space.is_full());
    }
}
