//! Compiled `type/subtype` matcher, built once from the filtered-media-type
//! configuration and then queried for every `Content-Type` encountered while
//! scanning a message.
//!
//! `*` matches any type or any subtype, so `("text", "*")` filters every
//! `text/...` part and `("*", "*")` filters everything.

use std::collections::{HashMap, HashSet};

use pop3filter_types::config::MediaType;

const WILDCARD: &str = "*";

#[derive(Debug, Default)]
struct SubtypeSet {
    wildcard: bool,
    subtypes: HashSet<String>,
}

#[derive(Debug, Default)]
pub struct MatcherTree {
    wildcard_type: Option<SubtypeSet>,
    types: HashMap<String, SubtypeSet>,
}

impl MatcherTree {
    pub fn compile<'a>(media_types: impl IntoIterator<Item = &'a MediaType>) -> Self {
        let mut tree = Self::default();
        for (typ, subtype) in media_types {
            let entry = if typ == WILDCARD {
                tree.wildcard_type.get_or_insert_with(SubtypeSet::default)
            } else {
                tree.types.entry(typ.to_lowercase()).or_default()
            };
            if subtype == WILDCARD {
                entry.wildcard = true;
            } else {
                entry.subtypes.insert(subtype.to_lowercase());
            }
        }
        tree
    }

    /// Whether `type/subtype` (already lowercased by the MIME value parser)
    /// is in the filtered set.
    pub fn is_match(&self, typ: &str, subtype: &str) -> bool {
        if let Some(set) = &self.wildcard_type {
            if set.wildcard || set.subtypes.contains(subtype) {
                return true;
            }
        }
        if let Some(set) = self.types.get(typ) {
            if set.wildcard || set.subtypes.contains(subtype) {
                return true;
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn media(typ: &str, sub: &str) -> MediaType {
        (typ.to_string(), sub.to_string())
    }

    #[test]
    fn exact_match() {
        let tree = MatcherTree::compile(&[media("text", "html")]);
        assert!(tree.is_match("text", "html"));
        assert!(!tree.is_match("text", "plain"));
    }

    #[test]
    fn subtype_wildcard_matches_any_subtype_of_its_type() {
        let tree = MatcherTree::compile(&[media("image", "*")]);
        assert!(tree.is_match("image", "png"));
        assert!(tree.is_match("image", "gif"));
        assert!(!tree.is_match("text", "png"));
    }

    #[test]
    fn type_wildcard_matches_everything() {
        let tree = MatcherTree::compile(&[media("*", "*")]);
        assert!(tree.is_match("whatever", "thing"));
    }

    #[test]
    fn empty_tree_matches_nothing() {
        let tree = MatcherTree::compile(&[]);
        assert!(!tree.is_match("text", "html"));
    }
}
