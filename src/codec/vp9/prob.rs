//! Backward probability adaptation
//!
//! At the end of every frame the probabilities used to code it are pulled
//! toward the symbol frequencies actually observed. The update is weighted by
//! how many observations were made: sparse statistics move a probability only
//! a little, and even abundant statistics never move it by more than
//! `max_update_factor / 256` of the distance to the empirical value.
//!
//! Probabilities are 8-bit values in `1..=255` giving P(bit == 0) * 256.

use super::tree::{num_probs, TreeNode};

/// Clamp an integer probability into the codable range
#[inline]
pub const fn clip_prob(p: i64) -> u8 {
    if p > 255 {
        255
    } else if p < 1 {
        1
    } else {
        p as u8
    }
}

/// Probability of `num` events out of `den`, rounded to nearest
#[inline]
pub fn get_prob(num: u32, den: u32) -> u8 {
    if den == 0 {
        return 128;
    }
    let p = (num as u64 * 256 + (den as u64 >> 1)) / den as u64;
    clip_prob(p as i64)
}

/// Probability of a zero bit given counts of zeros and ones
#[inline]
pub fn get_binary_prob(n0: u32, n1: u32) -> u8 {
    get_prob(n0, n0.saturating_add(n1))
}

/// Blend two probabilities, `factor` out of 256 going to `prob2`
///
/// # Panics
///
/// Panics if `factor` exceeds 256.
#[inline]
pub fn weighted_prob(prob1: u8, prob2: u8, factor: u32) -> u8 {
    assert!(factor <= 256, "update factor {} exceeds 256", factor);
    let sum = prob1 as u32 * (256 - factor) + prob2 as u32 * factor;
    ((sum + 128) >> 8) as u8
}

/// Merge a prior probability with one frame's branch counts
///
/// `counts[0]` counts the zero (left) branch, `counts[1]` the one (right)
/// branch.
///
/// # Panics
///
/// Panics if `count_sat` is 0 or `max_update_factor` exceeds 256.
#[inline]
pub fn merge_probs(pre_prob: u8, counts: [u32; 2], count_sat: u32, max_update_factor: u32) -> u8 {
    assert!(count_sat > 0, "count saturation must be nonzero");
    let prob = get_binary_prob(counts[0], counts[1]);
    let count = counts[0].saturating_add(counts[1]).min(count_sat);
    let factor = (max_update_factor as u64 * count as u64 / count_sat as u64) as u32;
    weighted_prob(pre_prob, prob, factor)
}

/// Merge every internal node of a tree
///
/// `counts` is indexed by leaf symbol; each node's branch counts are the sums
/// of the leaf counts below it. `pre_probs` and `probs` have one entry per
/// internal node.
pub fn tree_merge_probs(
    tree: &[TreeNode],
    pre_probs: &[u8],
    counts: &[u32],
    count_sat: u32,
    max_update_factor: u32,
    probs: &mut [u8],
) {
    debug_assert_eq!(pre_probs.len(), num_probs(tree));
    debug_assert_eq!(probs.len(), num_probs(tree));
    merge_node(tree, 0, pre_probs, counts, count_sat, max_update_factor, probs);
}

fn merge_node(
    tree: &[TreeNode],
    node: usize,
    pre_probs: &[u8],
    counts: &[u32],
    count_sat: u32,
    max_update_factor: u32,
    probs: &mut [u8],
) -> u32 {
    let branch = |slot: TreeNode, probs: &mut [u8]| match slot {
        TreeNode::Leaf(symbol) => counts[symbol as usize],
        TreeNode::Inner(next) => merge_node(
            tree,
            next as usize,
            pre_probs,
            counts,
            count_sat,
            max_update_factor,
            probs,
        ),
    };

    let left = branch(tree[node], probs);
    let right = branch(tree[node + 1], probs);
    probs[node >> 1] = merge_probs(pre_probs[node >> 1], [left, right], count_sat, max_update_factor);
    left.saturating_add(right)
}
