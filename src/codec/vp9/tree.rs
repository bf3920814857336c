//! Binary coding trees
//!
//! Every tree-coded symbol in the motion-vector model (joint type, class,
//! class0 index, fractional pel, global motion type) is described by a flat
//! array of child pairs. The pair stored at array index `i` (always even) is
//! one internal node; it is coded with probability `probs[i >> 1]`, where a
//! `false` bit takes the left child and a `true` bit the right child.

/// One child slot of an internal tree node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeNode {
    /// Terminal symbol value
    Leaf(u8),
    /// Array index of the child pair of the next internal node
    Inner(u8),
}

/// Number of internal nodes (and probabilities) of a tree
pub const fn num_probs(tree: &[TreeNode]) -> usize {
    tree.len() / 2
}

/// Deepest tree the symbol coders handle
pub const MAX_TREE_DEPTH: usize = 16;

/// Visit the branch decisions leading from the root to `symbol`
///
/// Calls `f(node index, bit)` for every internal node on the way, in coding
/// order. Returns `false` without calling `f` when `symbol` is not a leaf of
/// the tree.
pub fn walk(tree: &[TreeNode], symbol: u8, mut f: impl FnMut(usize, bool)) -> bool {
    let Some(mut slot) = tree.iter().position(|&n| n == TreeNode::Leaf(symbol)) else {
        return false;
    };

    // Climb from the leaf to the root, then replay top-down
    let mut steps = [(0usize, false); MAX_TREE_DEPTH];
    let mut depth = 0;
    loop {
        let node = slot & !1;
        steps[depth] = (node, slot & 1 == 1);
        depth += 1;
        if node == 0 {
            break;
        }
        match tree.iter().position(|&n| n == TreeNode::Inner(node as u8)) {
            Some(parent) => slot = parent,
            None => return false,
        }
    }

    for &(node, bit) in steps[..depth].iter().rev() {
        f(node, bit);
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::vp9::tables::{MV_CLASS_TREE, MV_FP_TREE, MV_JOINT_TREE};

    fn path(tree: &[TreeNode], symbol: u8) -> Option<Vec<(usize, bool)>> {
        let mut steps = Vec::new();
        let found = walk(tree, symbol, |node, bit| steps.push((node, bit)));
        found.then_some(steps)
    }

    #[test]
    fn test_num_probs() {
        assert_eq!(num_probs(&MV_JOINT_TREE), 3);
        assert_eq!(num_probs(&MV_CLASS_TREE), 10);
        assert_eq!(num_probs(&MV_FP_TREE), 3);
    }

    #[test]
    fn test_path_joint_tree() {
        assert_eq!(path(&MV_JOINT_TREE, 0), Some(vec![(0, false)]));
        assert_eq!(path(&MV_JOINT_TREE, 1), Some(vec![(0, true), (2, false)]));
        assert_eq!(
            path(&MV_JOINT_TREE, 3),
            Some(vec![(0, true), (2, true), (4, true)])
        );
        assert_eq!(path(&MV_JOINT_TREE, 4), None);
    }

    #[test]
    fn test_path_class_tree() {
        // Class 6 sits at the left child of the pair at index 12
        let steps = path(&MV_CLASS_TREE, 6).unwrap();
        assert_eq!(
            steps,
            vec![(0, true), (2, true), (4, true), (8, true), (12, false)]
        );
        for class in 0..11u8 {
            assert!(path(&MV_CLASS_TREE, class).is_some());
        }
    }

    #[test]
    fn test_walk_unknown_symbol_visits_nothing() {
        let mut visited = 0;
        assert!(!walk(&MV_FP_TREE, 9, |_, _| visited += 1));
        assert_eq!(visited, 0);
    }
}
