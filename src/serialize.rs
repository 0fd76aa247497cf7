//! Reshape an ordered list of named records into a name-keyed tree
//!
//! Plain names become keys. Bracket suffixes nest: `tags[]` appends to a
//! list, `address[city]` creates a branch, and the two combine
//! (`contacts[][phone]`). Names whose brackets do not parse are used
//! verbatim as keys.

use serde::Serialize;
use std::collections::BTreeMap;

/// One node of the shaped output
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum NameTree<T> {
    Leaf(T),
    List(Vec<NameTree<T>>),
    Branch(BTreeMap<String, NameTree<T>>),
}

impl<T> NameTree<T> {
    pub fn as_leaf(&self) -> Option<&T> {
        match self {
            NameTree::Leaf(value) => Some(value),
            _ => None,
        }
    }

    /// All leaves, depth first
    pub fn leaves(&self) -> Vec<&T> {
        match self {
            NameTree::Leaf(value) => vec![value],
            NameTree::List(items) => items.iter().flat_map(NameTree::leaves).collect(),
            NameTree::Branch(map) => map.values().flat_map(NameTree::leaves).collect(),
        }
    }
}

/// Top level of the shaped output
pub type Shaped<T> = BTreeMap<String, NameTree<T>>;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Key(String),
    Append,
}

/// Shape records into a name-keyed tree; later records win on conflicts
pub fn serialize<T>(records: impl IntoIterator<Item = (String, T)>) -> Shaped<T> {
    let mut shaped = BTreeMap::new();
    for (name, value) in records {
        let (base, path) = parse_name(&name);
        insert_into_map(&mut shaped, base, &path, value);
    }
    shaped
}

/// Split `base[a][]` into `base` and its path; malformed names come back whole
fn parse_name(name: &str) -> (String, Vec<Segment>) {
    let Some(open) = name.find('[') else {
        return (name.to_string(), Vec::new());
    };
    if open == 0 {
        return (name.to_string(), Vec::new());
    }

    let mut path = Vec::new();
    let mut rest = &name[open..];
    while !rest.is_empty() {
        let Some(inner) = rest.strip_prefix('[') else {
            return (name.to_string(), Vec::new());
        };
        let Some(close) = inner.find(']') else {
            return (name.to_string(), Vec::new());
        };
        let segment = &inner[..close];
        if segment.contains('[') {
            return (name.to_string(), Vec::new());
        }
        path.push(if segment.is_empty() {
            Segment::Append
        } else {
            Segment::Key(segment.to_string())
        });
        rest = &inner[close + 1..];
    }

    (name[..open].to_string(), path)
}

fn insert_into_map<T>(
    map: &mut BTreeMap<String, NameTree<T>>,
    key: String,
    path: &[Segment],
    value: T,
) {
    match path.split_first() {
        None => {
            map.insert(key, NameTree::Leaf(value));
        }
        Some((Segment::Append, rest)) => {
            let slot = map
                .entry(key)
                .or_insert_with(|| NameTree::List(Vec::new()));
            push_into_list(ensure_list(slot), rest, value);
        }
        Some((Segment::Key(child), rest)) => {
            let slot = map
                .entry(key)
                .or_insert_with(|| NameTree::Branch(BTreeMap::new()));
            insert_into_map(ensure_branch(slot), child.clone(), rest, value);
        }
    }
}

fn push_into_list<T>(items: &mut Vec<NameTree<T>>, path: &[Segment], value: T) {
    match path.split_first() {
        None => items.push(NameTree::Leaf(value)),
        Some((Segment::Append, rest)) => {
            let mut inner = Vec::new();
            push_into_list(&mut inner, rest, value);
            items.push(NameTree::List(inner));
        }
        Some((Segment::Key(child), rest)) => {
            let mut inner = BTreeMap::new();
            insert_into_map(&mut inner, child.clone(), rest, value);
            items.push(NameTree::Branch(inner));
        }
    }
}

fn ensure_list<T>(slot: &mut NameTree<T>) -> &mut Vec<NameTree<T>> {
    if !matches!(slot, NameTree::List(_)) {
        *slot = NameTree::List(Vec::new());
    }
    match slot {
        NameTree::List(items) => items,
        _ => unreachable!("slot was just replaced with a list"),
    }
}

fn ensure_branch<T>(slot: &mut NameTree<T>) -> &mut BTreeMap<String, NameTree<T>> {
    if !matches!(slot, NameTree::Branch(_)) {
        *slot = NameTree::Branch(BTreeMap::new());
    }
    match slot {
        NameTree::Branch(map) => map,
        _ => unreachable!("slot was just replaced with a branch"),
    }
}
