//! Huffman tree construction
//!
//! Nodes live in a single arena and refer to their children by index, so the
//! tree is dropped as one `Vec` and walked without recursion.

use crate::error::{CompressError, Result};
use crate::frequency::{FrequencyTable, Symbol};
use crate::min_heap::{MinHeap, Weighted};

/// Index of a node inside its tree's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HuffNode {
    Leaf {
        symbol: Symbol,
        weight: u64,
    },
    Internal {
        weight: u64,
        left: NodeId,
        right: NodeId,
    },
}

impl HuffNode {
    pub fn weight(&self) -> u64 {
        match self {
            HuffNode::Leaf { weight, .. } | HuffNode::Internal { weight, .. } => *weight,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct HeapEntry {
    weight: u64,
    node: NodeId,
}

impl Weighted for HeapEntry {
    fn weight(&self) -> u64 {
        self.weight
    }
}

#[derive(Debug, Clone)]
pub struct HuffmanTree {
    nodes: Vec<HuffNode>,
    root: NodeId,
}

impl HuffmanTree {
    /// Build the tree for a non-empty alphabet.
    ///
    /// Leaves enter the heap in ascending symbol order. Each round the first
    /// extracted node becomes the left child (bit 0) and the second the right
    /// child (bit 1). A one-symbol alphabet yields a lone leaf as the root.
    pub fn build(frequencies: &FrequencyTable) -> Result<Self> {
        if frequencies.is_empty() {
            return Err(CompressError::EmptyAlphabet);
        }

        let mut nodes = Vec::with_capacity(2 * frequencies.len() - 1);
        let mut entries = Vec::with_capacity(frequencies.len());
        for (symbol, weight) in frequencies.iter() {
            entries.push(HeapEntry {
                weight,
                node: NodeId(nodes.len()),
            });
            nodes.push(HuffNode::Leaf { symbol, weight });
        }

        let mut heap = MinHeap::build(entries);
        while heap.len() > 1 {
            let first = heap.extract_min()?;
            let second = heap.extract_min()?;
            let weight = first.weight.saturating_add(second.weight);
            let node = NodeId(nodes.len());
            nodes.push(HuffNode::Internal {
                weight,
                left: first.node,
                right: second.node,
            });
            heap.insert(HeapEntry { weight, node });
        }
        let root = heap.extract_min()?.node;

        Ok(HuffmanTree { nodes, root })
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> &HuffNode {
        &self.nodes[id.0]
    }

    /// Symbol stored at `id`, or `None` for an internal node.
    pub fn symbol(&self, id: NodeId) -> Option<Symbol> {
        match self.node(id) {
            HuffNode::Leaf { symbol, .. } => Some(*symbol),
            HuffNode::Internal { .. } => None,
        }
    }

    /// Step one edge down: `false` goes left, `true` goes right.
    /// Returns `None` when `id` is a leaf.
    pub fn child(&self, id: NodeId, bit: bool) -> Option<NodeId> {
        match self.node(id) {
            HuffNode::Leaf { .. } => None,
            HuffNode::Internal { left, right, .. } => Some(if bit { *right } else { *left }),
        }
    }

    pub fn is_single_leaf(&self) -> bool {
        matches!(self.node(self.root), HuffNode::Leaf { .. })
    }

    pub fn leaf_count(&self) -> usize {
        // a full binary tree with n leaves has 2n - 1 nodes
        (self.nodes.len() + 1) / 2
    }

    pub fn weight(&self) -> u64 {
        self.node(self.root).weight()
    }

    /// Longest root-to-leaf path, in edges.
    pub fn height(&self) -> usize {
        let mut max = 0;
        let mut stack = vec![(self.root, 0usize)];
        while let Some((id, depth)) = stack.pop() {
            match self.node(id) {
                HuffNode::Leaf { .. } => max = max.max(depth),
                HuffNode::Internal { left, right, .. } => {
                    stack.push((*left, depth + 1));
                    stack.push((*right, depth + 1));
                }
            }
        }
        max
    }
}
