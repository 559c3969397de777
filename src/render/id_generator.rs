//! Derives short, stable, collision-disambiguated element ids, and the
//! bidirectional id ↔ backend-node map that element resolution and
//! similarity lookups read.
//!
//! A fresh generator is built per render and swapped into the shared slot
//! with a single guarded `replace_with` — never mutated in place while
//! published.

use crate::render::roles::{ElementType, FORM_ID_PREFIX, HEADING_ID_PREFIX, UNKNOWN_ID_PREFIX};
use crate::render::signature::DomPathSignature;
use md5::{Digest, Md5};
use std::collections::{HashMap, HashSet};

/// The kind of entity an id was minted for, for `TYPE_PREFIX_MAP` lookups
/// beyond `ElementType` (headings, landmarks, forms).
#[derive(Debug, Clone, Copy)]
pub enum IdKind<'a> {
    Element(ElementType),
    Heading,
    Form,
    Landmark,
    Unknown(&'a str),
}

impl<'a> IdKind<'a> {
    fn prefix(self) -> &'a str {
        match self {
            IdKind::Element(t) => t.id_prefix(),
            IdKind::Heading => HEADING_ID_PREFIX,
            IdKind::Form => FORM_ID_PREFIX,
            IdKind::Landmark => crate::render::roles::LANDMARK_ID_PREFIX,
            IdKind::Unknown(_) => UNKNOWN_ID_PREFIX,
        }
    }

    fn kind_key(self) -> &'a str {
        match self {
            IdKind::Element(t) => t.as_str(),
            IdKind::Heading => "heading",
            IdKind::Form => "form",
            IdKind::Landmark => "landmark",
            IdKind::Unknown(role) => role,
        }
    }
}

#[derive(Debug, Default)]
pub struct ElementIdGenerator {
    id_to_backend: HashMap<String, i64>,
    backend_to_id: HashMap<i64, String>,
    used_ids: HashSet<String>,
}

impl ElementIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Derive an id from `(kind, role, name, signature)`, disambiguating
    /// collisions with a `-2`, `-3`, … suffix. Deterministic: same inputs
    /// in the same call order always produce the same id set.
    pub fn generate_id(
        &mut self,
        kind: IdKind<'_>,
        role: &str,
        name: &str,
        sig: &DomPathSignature,
        backend_id: Option<i64>,
    ) -> String {
        let prefix = kind.prefix();
        let composite = format!(
            "{}|{}|{}|{}|{}|{}|{}",
            kind.kind_key(),
            role,
            name,
            sig.nearest_landmark_role.as_deref().unwrap_or(""),
            sig.nearest_landmark_label.as_deref().unwrap_or(""),
            sig.nearest_labelled_container.as_deref().unwrap_or(""),
            sig.sibling_index,
        );

        let hex4 = hash4(&composite);

        let mut candidate = format!("{}-{}", prefix, hex4);
        let mut suffix = 2u32;
        while self.used_ids.contains(&candidate) {
            candidate = format!("{}-{}-{}", prefix, hex4, suffix);
            suffix += 1;
        }

        self.used_ids.insert(candidate.clone());
        if let Some(backend) = backend_id {
            self.id_to_backend.insert(candidate.clone(), backend);
            self.backend_to_id.insert(backend, candidate.clone());
        }
        candidate
    }

    /// O(1) lookup of the backend DOM node id an element id resolves to.
    pub fn resolve_id(&self, id: &str) -> Option<i64> {
        self.id_to_backend.get(id).copied()
    }

    pub fn id_for_backend_node(&self, backend_id: i64) -> Option<&str> {
        self.backend_to_id.get(&backend_id).map(String::as_str)
    }

    /// Recovery path: if the prefix of `id` (substring before the first
    /// `-`) matches exactly one id currently known, return it.
    pub fn find_similar(&self, id: &str, current_elements: &[String]) -> Option<String> {
        let prefix = id.split('-').next()?;
        let mut matches = current_elements
            .iter()
            .filter(|candidate| candidate.split('-').next() == Some(prefix));
        let first = matches.next()?;
        if matches.next().is_some() {
            None
        } else {
            Some(first.clone())
        }
    }

    /// Atomically adopt `other`'s tables. The caller is expected to hold
    /// whatever guard publishes `self`: this function itself is a plain
    /// move, the atomicity comes from how the caller swaps the guarded
    /// slot.
    pub fn replace_with(&mut self, other: ElementIdGenerator) {
        *self = other;
    }

    pub fn used_ids(&self) -> &HashSet<String> {
        &self.used_ids
    }
}

fn hash4(composite: &str) -> String {
    let digest = Md5::digest(composite.as_bytes());
    format!("{:02x}{:02x}", digest[0], digest[1])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::roles::ElementType;

    fn sig() -> DomPathSignature {
        DomPathSignature::default()
    }

    #[test]
    fn ids_match_the_public_contract_shape() {
        let mut gen = ElementIdGenerator::new();
        let id = gen.generate_id(IdKind::Element(ElementType::Button), "button", "Go", &sig(), Some(1));
        let re = regex::Regex::new(r"^[a-z]{3}-[0-9a-f]{4}(-[0-9]+)?$").unwrap();
        assert!(re.is_match(&id), "id {} didn't match contract shape", id);
    }

    #[test]
    fn collisions_disambiguate_with_suffix() {
        let mut gen = ElementIdGenerator::new();
        let sig = sig();
        let first = gen.generate_id(IdKind::Element(ElementType::Button), "button", "Submit", &sig, Some(1));
        let second = gen.generate_id(IdKind::Element(ElementType::Button), "button", "Submit", &sig, Some(2));
        assert_ne!(first, second);
        assert!(second.starts_with(&format!("{}-2", first)));
        assert_eq!(gen.resolve_id(&first), Some(1));
        assert_eq!(gen.resolve_id(&second), Some(2));
    }

    #[test]
    fn deterministic_across_generators() {
        let sig = sig();
        let mut a = ElementIdGenerator::new();
        let mut b = ElementIdGenerator::new();
        let id_a = a.generate_id(IdKind::Element(ElementType::Link), "link", "More", &sig, Some(9));
        let id_b = b.generate_id(IdKind::Element(ElementType::Link), "link", "More", &sig, Some(9));
        assert_eq!(id_a, id_b);
    }

    #[test]
    fn find_similar_requires_unique_prefix_match() {
        let current = vec!["btn-aaaa".to_string(), "lnk-bbbb".to_string()];
        let gen = ElementIdGenerator::new();
        assert_eq!(
            gen.find_similar("btn-dead", &current),
            Some("btn-aaaa".to_string())
        );
        let current_ambiguous = vec!["btn-aaaa".to_string(), "btn-cccc".to_string()];
        assert_eq!(gen.find_similar("btn-dead", &current_ambiguous), None);
    }

    #[test]
    fn replace_with_swaps_whole_state() {
        let mut shared = ElementIdGenerator::new();
        let old_id = shared.generate_id(IdKind::Element(ElementType::Button), "button", "Old", &sig(), Some(1));
        assert_eq!(shared.resolve_id(&old_id), Some(1));

        let mut fresh = ElementIdGenerator::new();
        let id = fresh.generate_id(IdKind::Element(ElementType::Button), "button", "New", &sig(), Some(2));
        shared.replace_with(fresh);
        assert_eq!(shared.resolve_id(&id), Some(2));
        assert_eq!(shared.resolve_id(&old_id), None);
    }
}
