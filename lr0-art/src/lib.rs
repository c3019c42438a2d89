//! Adaptive Radix Tree construction for keyword-prefix scanning.
//!
//! Built in two phases: `count_required_nodes` walks the sorted key set to
//! decide how many of each node variant the final tree needs, then
//! `ArtBuilder::build` walks it again to fill pre-sized arenas. No node is
//! ever resized or reallocated once created.

mod nodes;

use std::error::Error;
use std::fmt::{self, Display, Formatter};

use nodes::{Node16, Node256, Node4, Node48, NodesCount};

/// Dispatch byte for the child that represents "this prefix is itself a
/// complete key". A key that is a strict prefix of another key has no byte
/// of its own to branch on, so it is keyed on this value instead, the same
/// way any other child is keyed on its next real byte — it still gets its
/// own node, sized and reached exactly like a sibling with a real byte.
///
/// Reusing byte `0x00` for this is only sound because this tree's keys are
/// ASCII keyword literals (`true`, `int`, `null`, ...): no real byte in that
/// domain is ever `0x00`. `ArtBuilder::insert` enforces the precondition by
/// rejecting any key containing a NUL byte, so the two meanings of `0x00`
/// can never collide in a built tree.
const END_OF_KEY: u8 = 0x00;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtError {
    EmptyKeySet,
    DuplicateKey(Vec<u8>),
    /// A key contained a literal NUL byte, which this tree reserves as the
    /// dispatch value for "key ends here".
    ReservedByte(Vec<u8>),
}

impl Display for ArtError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ArtError::EmptyKeySet => write!(f, "cannot build a tree over zero keys"),
            ArtError::DuplicateKey(key) => write!(f, "duplicate key {key:?}"),
            ArtError::ReservedByte(key) => {
                write!(f, "key {key:?} contains a reserved NUL byte")
            }
        }
    }
}

impl Error for ArtError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NodeTag {
    Node4,
    Node16,
    Node48,
    Node256,
}

fn tag_for_len(len: usize) -> NodeTag {
    if len <= 4 {
        NodeTag::Node4
    } else if len <= 16 {
        NodeTag::Node16
    } else if len <= 48 {
        NodeTag::Node48
    } else {
        NodeTag::Node256
    }
}

/// Longest common prefix of every key in `entries`, starting after
/// `skip` bytes. Returns the correct capped length even when every key
/// agrees all the way to the shortest one's end; no key can be extended
/// past its own length, so the cap always terminates the comparison.
fn common_prefix_len(entries: &[(&[u8], usize)], skip: usize) -> usize {
    let first = &entries[0].0[skip..];
    let mut len = first.len();
    for &(key, _) in &entries[1..] {
        let rest = &key[skip..];
        let mut i = 0;
        while i < len && i < rest.len() && rest[i] == first[i] {
            i += 1;
        }
        len = len.min(i);
    }
    len
}

/// Splits `entries` (already sorted by key, all sharing the `skip`-byte
/// prefix) into runs that agree on their next byte after `skip`. A key
/// that ends exactly at `skip` (a strict prefix of its neighbors) has no
/// next byte, so it falls under the reserved `END_OF_KEY` byte instead —
/// its run, like any run keyed this way, has exactly one entry.
fn group_by_next_byte<'a>(entries: &[(&'a [u8], usize)], skip: usize) -> Vec<(u8, Vec<(&'a [u8], usize)>)> {
    let mut groups: Vec<(u8, Vec<(&'a [u8], usize)>)> = Vec::new();
    for &(key, payload_idx) in entries {
        let byte = key.get(skip).copied().unwrap_or(END_OF_KEY);
        match groups.last_mut() {
            Some((last_byte, run)) if *last_byte == byte => run.push((key, payload_idx)),
            _ => groups.push((byte, vec![(key, payload_idx)])),
        }
    }
    groups
}

/// Counts the nodes a tree over `entries` (sorted, `skip` bytes already
/// consumed) would require, recursing into each child run.
///
/// A run of exactly one entry always needs exactly one node, whether or
/// not its key continues past `skip`: the remaining suffix (possibly
/// empty) becomes that node's prefix, and the payload is recorded there.
/// A run of more than one entry is split again on its next distinguishing
/// byte, contributing one node for itself (sized by its fan-out) plus
/// whatever its children need. A key that is a strict prefix of its
/// siblings forms its own run under the `END_OF_KEY` byte, exactly like
/// any other run — that run always has exactly one entry (two keys can't
/// both end at the same point without being equal), so it bottoms out in
/// the singleton case above and contributes its own N4, same as any other
/// leaf.
fn count_required_nodes(entries: &[(&[u8], usize)], skip: usize) -> NodesCount {
    if entries.len() == 1 {
        let mut count = NodesCount::default();
        bump(&mut count, tag_for_len(1));
        return count;
    }

    let prefix_len = common_prefix_len(entries, skip);
    let groups = group_by_next_byte(entries, skip + prefix_len);

    let mut count = NodesCount::default();
    bump(&mut count, tag_for_len(groups.len()));

    for (byte, run) in groups {
        let next_skip = if byte == END_OF_KEY {
            skip + prefix_len
        } else {
            skip + prefix_len + 1
        };
        count += count_required_nodes(&run, next_skip);
    }

    count
}

fn bump(count: &mut NodesCount, tag: NodeTag) {
    match tag {
        NodeTag::Node4 => count.node4s += 1,
        NodeTag::Node16 => count.node16s += 1,
        NodeTag::Node48 => count.node48s += 1,
        NodeTag::Node256 => count.node256s += 1,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct NodeId {
    tag: NodeTag,
    index: usize,
}

/// Arenas for each node variant, plus the per-node prefix (the bytes
/// consumed between a node and its parent's dispatch byte) and payload
/// (set when the node itself terminates a key). Indexed by `NodeId`.
struct Arenas {
    node4s: Vec<Node4>,
    node16s: Vec<Node16>,
    node48s: Vec<Node48>,
    node256s: Vec<Node256>,
    prefixes: Vec<Vec<u8>>,
    payloads: Vec<Option<usize>>,
}

impl Arenas {
    fn with_capacity(count: NodesCount) -> Self {
        Arenas {
            node4s: Vec::with_capacity(count.node4s),
            node16s: Vec::with_capacity(count.node16s),
            node48s: Vec::with_capacity(count.node48s),
            node256s: Vec::with_capacity(count.node256s),
            prefixes: Vec::with_capacity(count.total()),
            payloads: Vec::with_capacity(count.total()),
        }
    }

    fn alloc(&mut self, tag: NodeTag, prefix: Vec<u8>, payload: Option<usize>) -> NodeId {
        let index = match tag {
            NodeTag::Node4 => {
                self.node4s.push(Node4::default());
                self.node4s.len() - 1
            }
            NodeTag::Node16 => {
                self.node16s.push(Node16::default());
                self.node16s.len() - 1
            }
            NodeTag::Node48 => {
                self.node48s.push(Node48::default());
                self.node48s.len() - 1
            }
            NodeTag::Node256 => {
                self.node256s.push(Node256::default());
                self.node256s.len() - 1
            }
        };
        self.prefixes.push(prefix);
        self.payloads.push(payload);
        NodeId { tag, index }
    }

    fn insert_child(&mut self, parent: NodeId, byte: u8, child: NodeId) {
        let packed = pack(child);
        match parent.tag {
            NodeTag::Node4 => self.node4s[parent.index].insert_next(byte, packed),
            NodeTag::Node16 => self.node16s[parent.index].insert_next(byte, packed),
            NodeTag::Node48 => self.node48s[parent.index].insert_next(byte, packed),
            NodeTag::Node256 => self.node256s[parent.index].insert_next(byte, packed),
        }
    }

    fn find_child(&self, parent: NodeId, byte: u8) -> Option<NodeId> {
        let packed = match parent.tag {
            NodeTag::Node4 => self.node4s[parent.index].find(byte),
            NodeTag::Node16 => self.node16s[parent.index].find(byte),
            NodeTag::Node48 => self.node48s[parent.index].find(byte),
            NodeTag::Node256 => self.node256s[parent.index].find(byte),
        };
        packed.map(unpack)
    }
}

/// Node references are packed into a single `usize` so every variant's
/// arena can share the same child-slot width: the low two bits name the
/// variant, the rest is the index within that variant's arena.
fn pack(id: NodeId) -> usize {
    let tag_bits = match id.tag {
        NodeTag::Node4 => 0,
        NodeTag::Node16 => 1,
        NodeTag::Node48 => 2,
        NodeTag::Node256 => 3,
    };
    (id.index << 2) | tag_bits
}

fn unpack(packed: usize) -> NodeId {
    let tag = match packed & 0b11 {
        0 => NodeTag::Node4,
        1 => NodeTag::Node16,
        2 => NodeTag::Node48,
        _ => NodeTag::Node256,
    };
    NodeId { tag, index: packed >> 2 }
}

/// An adaptive radix tree mapping byte-string keys to payloads of type
/// `P`, built once and queried by exact lookup.
pub struct Art<P> {
    arenas: Arenas,
    root: NodeId,
    payload_values: Vec<P>,
}

impl<P> Art<P> {
    /// Looks up `key`, returning its payload only on an exact match. Every
    /// key lives at a dedicated leaf node reached by ordinary byte
    /// dispatch; a key that is a strict prefix of a sibling is dispatched
    /// to exactly like any other, via the reserved `END_OF_KEY` byte, once
    /// it runs out of real bytes to consume. Branching nodes never carry a
    /// payload of their own.
    pub fn find(&self, key: &[u8]) -> Option<&P> {
        let mut node = self.root;
        let mut offset = 0;

        loop {
            let prefix = &self.arenas.prefixes[flat_index(node, &self.arenas)];
            if !key[offset..].starts_with(prefix.as_slice()) {
                return None;
            }
            offset += prefix.len();

            if offset == key.len() {
                // this node's own payload, if it has a key of its own, or
                // the sibling leaf reached via END_OF_KEY otherwise.
                if let Some(child) = self.arenas.find_child(node, END_OF_KEY) {
                    node = child;
                    continue;
                }
                return self.arenas.payloads[flat_index(node, &self.arenas)]
                    .map(|idx| &self.payload_values[idx]);
            }

            let byte = key[offset];
            match self.arenas.find_child(node, byte) {
                Some(child) => {
                    node = child;
                    offset += 1;
                }
                None => return None,
            }
        }
    }
}

/// Flat position of `node` across all four arenas, used only to index
/// the parallel `prefixes`/`payloads` vectors, which are filled in the
/// same allocation order as the arenas themselves.
fn flat_index(node: NodeId, arenas: &Arenas) -> usize {
    let base = match node.tag {
        NodeTag::Node4 => 0,
        NodeTag::Node16 => arenas.node4s.len(),
        NodeTag::Node48 => arenas.node4s.len() + arenas.node16s.len(),
        NodeTag::Node256 => arenas.node4s.len() + arenas.node16s.len() + arenas.node48s.len(),
    };
    base + node.index
}

/// Collects keys and builds an `Art` over them.
pub struct ArtBuilder<P> {
    entries: Vec<(Vec<u8>, P)>,
}

impl<P> ArtBuilder<P> {
    pub fn new() -> Self {
        ArtBuilder { entries: Vec::new() }
    }

    pub fn insert(&mut self, key: Vec<u8>, payload: P) -> Result<(), ArtError> {
        if key.contains(&END_OF_KEY) {
            return Err(ArtError::ReservedByte(key));
        }
        if self.entries.iter().any(|(k, _)| *k == key) {
            return Err(ArtError::DuplicateKey(key));
        }
        self.entries.push((key, payload));
        Ok(())
    }

    pub fn build(mut self) -> Result<Art<P>, ArtError> {
        if self.entries.is_empty() {
            return Err(ArtError::EmptyKeySet);
        }
        self.entries.sort_by(|a, b| a.0.cmp(&b.0));

        let (keys, payload_values): (Vec<Vec<u8>>, Vec<P>) = self.entries.into_iter().unzip();
        let refs: Vec<(&[u8], usize)> = keys.iter().map(|k| k.as_slice()).zip(0..).collect();

        let counts = count_required_nodes(&refs, 0);
        let mut arenas = Arenas::with_capacity(counts);
        let root = build_node(&refs, 0, &mut arenas);

        Ok(Art { arenas, root, payload_values })
    }
}

impl<P> Default for ArtBuilder<P> {
    fn default() -> Self {
        Self::new()
    }
}

fn build_node(entries: &[(&[u8], usize)], skip: usize, arenas: &mut Arenas) -> NodeId {
    if entries.len() == 1 {
        let (key, payload_idx) = entries[0];
        let prefix = key[skip..].to_vec();
        return arenas.alloc(tag_for_len(1), prefix, Some(payload_idx));
    }

    let prefix_len = common_prefix_len(entries, skip);
    let groups = group_by_next_byte(entries, skip + prefix_len);
    let prefix = entries[0].0[skip..skip + prefix_len].to_vec();

    let node = arenas.alloc(tag_for_len(groups.len()), prefix, None);

    for (byte, run) in groups {
        let next_skip = if byte == END_OF_KEY {
            skip + prefix_len
        } else {
            skip + prefix_len + 1
        };
        let child = build_node(&run, next_skip, arenas);
        arenas.insert_child(node, byte, child);
    }

    node
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keywords() -> Art<&'static str> {
        let mut builder = ArtBuilder::new();
        builder.insert(b"true".to_vec(), "true").unwrap();
        builder.insert(b"false".to_vec(), "false").unwrap();
        builder.insert(b"null".to_vec(), "null").unwrap();
        builder.build().unwrap()
    }

    #[test]
    fn finds_exact_keys() {
        let tree = keywords();
        assert_eq!(tree.find(b"true"), Some(&"true"));
        assert_eq!(tree.find(b"false"), Some(&"false"));
        assert_eq!(tree.find(b"null"), Some(&"null"));
    }

    #[test]
    fn rejects_prefixes_and_extensions() {
        let tree = keywords();
        assert_eq!(tree.find(b"tru"), None);
        assert_eq!(tree.find(b"truer"), None);
        assert_eq!(tree.find(b"nul"), None);
        assert_eq!(tree.find(b""), None);
    }

    #[test]
    fn key_that_is_a_strict_prefix_of_another_forms_a_leaf_sibling() {
        let mut builder = ArtBuilder::new();
        builder.insert(b"in".to_vec(), 1).unwrap();
        builder.insert(b"int".to_vec(), 2).unwrap();
        let tree = builder.build().unwrap();

        assert_eq!(tree.find(b"in"), Some(&1));
        assert_eq!(tree.find(b"int"), Some(&2));
        assert_eq!(tree.find(b"i"), None);
        assert_eq!(tree.find(b"ints"), None);
    }

    #[test]
    fn rejects_empty_key_set() {
        let builder: ArtBuilder<()> = ArtBuilder::new();
        assert_eq!(builder.build().unwrap_err(), ArtError::EmptyKeySet);
    }

    #[test]
    fn rejects_duplicate_key() {
        let mut builder = ArtBuilder::new();
        builder.insert(b"true".to_vec(), 1).unwrap();
        let err = builder.insert(b"true".to_vec(), 2).unwrap_err();
        assert_eq!(err, ArtError::DuplicateKey(b"true".to_vec()));
    }

    #[test]
    fn rejects_key_with_reserved_nul_byte() {
        let mut builder: ArtBuilder<()> = ArtBuilder::new();
        let key = vec![b't', b'r', 0x00, b'e'];
        let err = builder.insert(key.clone(), ()).unwrap_err();
        assert_eq!(err, ArtError::ReservedByte(key));
    }

    #[test]
    fn node_variant_grows_with_fan_out() {
        // 5 distinct first bytes forces a Node16 at the root, not a Node4.
        let mut builder = ArtBuilder::new();
        for (i, word) in ["a", "b", "c", "d", "e"].iter().enumerate() {
            builder.insert(word.as_bytes().to_vec(), i).unwrap();
        }
        let tree = builder.build().unwrap();
        for (i, word) in ["a", "b", "c", "d", "e"].iter().enumerate() {
            assert_eq!(tree.find(word.as_bytes()), Some(&i));
        }
    }

    #[test]
    fn leaf_sibling_counts_toward_its_parents_fan_out() {
        // "a" is a leaf sibling of the other four, so the branch point has
        // five children (the END_OF_KEY leaf plus b/c/d/e), forcing a
        // Node16 the same as five ordinary children would.
        let mut builder = ArtBuilder::new();
        for (i, word) in ["a", "ab", "ac", "ad", "ae"].iter().enumerate() {
            builder.insert(word.as_bytes().to_vec(), i).unwrap();
        }
        let tree = builder.build().unwrap();
        for (i, word) in ["a", "ab", "ac", "ad", "ae"].iter().enumerate() {
            assert_eq!(tree.find(word.as_bytes()), Some(&i));
        }
        assert_eq!(tree.find(b"af"), None);
    }
}
