//! Code table derivation
//!
//! Codes are read straight off the tree shape: 0 for every left edge, 1 for
//! every right edge, recorded only at leaves. No canonicalisation.

use std::collections::BTreeMap;
use std::fmt;

use tracing::{debug, trace};

use crate::container::PresenceBitmap;
use crate::frequency::Symbol;
use crate::tree::{HuffNode, HuffmanTree, NodeId};

/// Root-to-leaf path, first edge first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Code {
    bits: Vec<bool>,
}

impl Code {
    pub fn bits(&self) -> &[bool] {
        &self.bits
    }

    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    pub fn is_prefix_of(&self, other: &Code) -> bool {
        other.bits.starts_with(&self.bits)
    }

    fn pushed(&self, bit: bool) -> Code {
        let mut bits = Vec::with_capacity(self.bits.len() + 1);
        bits.extend_from_slice(&self.bits);
        bits.push(bit);
        Code { bits }
    }
}

impl From<&str> for Code {
    fn from(text: &str) -> Self {
        Code {
            bits: text.chars().map(|c| c == '1').collect(),
        }
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &bit in &self.bits {
            f.write_str(if bit { "1" } else { "0" })?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct CodeTable {
    codes: BTreeMap<Symbol, Code>,
    presence: PresenceBitmap,
}

impl CodeTable {
    /// Depth-first walk with an explicit stack, left subtree before right.
    ///
    /// A lone leaf at the root has no edges to follow; it gets the one-bit
    /// code `0` so every symbol still costs at least one bit.
    pub fn from_tree(tree: &HuffmanTree) -> Self {
        let mut table = CodeTable::default();
        let mut stack: Vec<(NodeId, Code)> = vec![(tree.root(), Code::default())];

        while let Some((id, path)) = stack.pop() {
            match tree.node(id) {
                HuffNode::Leaf { symbol, .. } => {
                    let code = if path.is_empty() { Code::from("0") } else { path };
                    trace!(symbol = *symbol, code = %code, "assigned code");
                    table.presence.mark(*symbol);
                    table.codes.insert(*symbol, code);
                }
                HuffNode::Internal { left, right, .. } => {
                    stack.push((*right, path.pushed(true)));
                    stack.push((*left, path.pushed(false)));
                }
            }
        }

        debug!(
            symbols = table.codes.len(),
            max_code_len = table.max_len(),
            "derived code table"
        );
        table
    }

    pub fn get(&self, symbol: Symbol) -> Option<&Code> {
        self.codes.get(&symbol)
    }

    pub fn presence(&self) -> &PresenceBitmap {
        &self.presence
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    pub fn max_len(&self) -> usize {
        self.codes.values().map(Code::len).max().unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Symbol, &Code)> + '_ {
        self.codes.iter().map(|(&s, c)| (s, c))
    }
}
