// --- File: src/core/trie.rs
use std::collections::HashMap;

/// The most popular reference name seen below a trie node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopName {
    /// The cleaned reference key.
    pub name: String,
    pub norm_name: String,
    pub popularity: u64,
}

#[derive(Debug, Clone)]
pub struct TrieNode {
    children: HashMap<char, usize>,
    top: Option<TopName>,
}

impl TrieNode {
    fn new(top: Option<TopName>) -> Self {
        Self { children: HashMap::new(), top }
    }

    pub fn top(&self) -> Option<&TopName> {
        self.top.as_ref()
    }

    fn offer(&mut self, name: &str, norm_name: &str, popularity: u64) {
        let replace = match &self.top {
            Some(top) => popularity > top.popularity,
            None => true,
        };
        if replace {
            self.top = Some(TopName {
                name: name.to_string(),
                norm_name: norm_name.to_string(),
                popularity,
            });
        }
    }
}

/// A character trie over cleaned reference keys. Every node caches the most
/// popular key passing through its prefix.
///
/// Nodes live in a flat arena and refer to their children by index, so the
/// structure cannot hold cycles and is dropped in one piece.
#[derive(Debug, Clone)]
pub struct PrefixTrie {
    nodes: Vec<TrieNode>,
}

impl Default for PrefixTrie {
    fn default() -> Self {
        Self::new()
    }
}

impl PrefixTrie {
    pub fn new() -> Self {
        Self { nodes: vec![TrieNode::new(None)] }
    }

    pub fn root(&self) -> &TrieNode {
        &self.nodes[0]
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Inserts a key, updating the cached top name of every node on its path.
    /// O(k) complexity where k is key length.
    pub fn insert(&mut self, key: &str, norm_name: &str, popularity: u64) {
        let mut node_idx = 0;
        self.nodes[node_idx].offer(key, norm_name, popularity);

        for c in key.chars() {
            let existing = self.nodes[node_idx].children.get(&c).copied();
            node_idx = if let Some(id) = existing {
                self.nodes[id].offer(key, norm_name, popularity);
                id
            } else {
                let new_node_id = self.nodes.len();
                self.nodes.push(TrieNode::new(Some(TopName {
                    name: key.to_string(),
                    norm_name: norm_name.to_string(),
                    popularity,
                })));
                self.nodes[node_idx].children.insert(c, new_node_id);
                new_node_id
            };
        }
    }

    /// Walks `query` from the root for as long as a child exists and returns
    /// the deepest node reached along with the length of the shared prefix
    /// in characters.
    pub fn longest_prefix(&self, query: &str) -> (&TrieNode, usize) {
        let mut node_idx = 0;
        let mut depth = 0;
        for c in query.chars() {
            match self.nodes[node_idx].children.get(&c) {
                Some(&next_idx) => {
                    node_idx = next_idx;
                    depth += 1;
                }
                None => break,
            }
        }
        (&self.nodes[node_idx], depth)
    }

    /// Returns the node for exactly `prefix`, if some key starts with it.
    pub fn find(&self, prefix: &str) -> Option<&TrieNode> {
        let mut node_idx = 0;
        for c in prefix.chars() {
            node_idx = *self.nodes[node_idx].children.get(&c)?;
        }
        Some(&self.nodes[node_idx])
    }
}
