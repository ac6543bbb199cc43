//! Merge trees produced by hierarchical clustering, and their display order.

use crate::libs::distance::DistanceMatrix;
use crate::libs::error::{HeatmapError, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// Binary merge tree over trait indices.
///
/// In JSON a leaf is a bare index and a node is a two element array,
/// e.g. `[0, [1, 2]]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeTree {
    Leaf(usize),
    Node(Box<MergeTree>, Box<MergeTree>),
}

impl MergeTree {
    pub fn node(left: MergeTree, right: MergeTree) -> Self {
        MergeTree::Node(Box::new(left), Box::new(right))
    }

    pub fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::Number(num) => match num.as_u64() {
                Some(idx) => Ok(MergeTree::Leaf(idx as usize)),
                None => Err(HeatmapError::MalformedMergeTree(format!(
                    "leaf `{}` is not a trait index",
                    num
                ))),
            },
            Value::Array(items) if items.len() == 2 => Ok(MergeTree::node(
                Self::from_value(&items[0])?,
                Self::from_value(&items[1])?,
            )),
            Value::Array(items) => Err(HeatmapError::MalformedMergeTree(format!(
                "node has {} children, expected 2",
                items.len()
            ))),
            other => Err(HeatmapError::MalformedMergeTree(format!(
                "unexpected node `{}`",
                other
            ))),
        }
    }

    /// Parse the JSON form.
    ///
    /// Single linkage tends to build chains, so nesting is not capped at
    /// serde_json's default depth of 128.
    pub fn from_json(s: &str) -> Result<Self> {
        let mut de = serde_json::Deserializer::from_str(s);
        de.disable_recursion_limit();
        let value = Value::deserialize(&mut de)?;
        de.end()?;
        Self::from_value(&value)
    }

    /// Leaf indices, left to right
    pub fn leaves(&self) -> Vec<usize> {
        compute_traits_order(self)
    }

    /// `true` if the leaves are exactly `0..n`, each once
    pub fn is_permutation_of(&self, n: usize) -> bool {
        let mut leaves = self.leaves();
        leaves.sort_unstable();
        leaves.len() == n && leaves.iter().enumerate().all(|(i, &leaf)| i == leaf)
    }

    /// Newick string, labelling leaf `i` with `labels[i]` when available.
    pub fn to_newick(&self, labels: &[String]) -> String {
        fn helper(tree: &MergeTree, labels: &[String], out: &mut String) {
            match tree {
                MergeTree::Leaf(idx) => match labels.get(*idx) {
                    Some(label) => out.push_str(&quote_label(label)),
                    None => out.push_str(&idx.to_string()),
                },
                MergeTree::Node(left, right) => {
                    out.push('(');
                    helper(left, labels, out);
                    out.push(',');
                    helper(right, labels, out);
                    out.push(')');
                }
            }
        }

        let mut out = String::new();
        helper(self, labels, &mut out);
        out.push(';');
        out
    }
}

// Newick metacharacters force single quotes
fn quote_label(label: &str) -> String {
    if label.chars().any(|c| "(),:;[]' \t\n".contains(c)) {
        format!("'{}'", label.replace('\'', "''"))
    } else {
        label.to_string()
    }
}

impl Serialize for MergeTree {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            MergeTree::Leaf(idx) => serializer.serialize_u64(*idx as u64),
            MergeTree::Node(left, right) => (left, right).serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for MergeTree {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        MergeTree::from_value(&value).map_err(serde::de::Error::custom)
    }
}

/// Flatten a merge tree into the display order of its leaves.
///
/// Depth first, left subtree before right subtree; distances are never
/// consulted, so the order is whatever the clusterer put on each side.
///
/// ```
/// use gnhm::libs::merge_tree::{compute_traits_order, MergeTree};
///
/// let tree = MergeTree::from_json("[0, [1, 2]]").unwrap();
/// assert_eq!(compute_traits_order(&tree), vec![0, 1, 2]);
///
/// let tree = MergeTree::from_json("[[0, 1], 2]").unwrap();
/// assert_eq!(compute_traits_order(&tree), vec![0, 1, 2]);
/// ```
pub fn compute_traits_order(tree: &MergeTree) -> Vec<usize> {
    fn order_maker(mut order: Vec<usize>, node: &MergeTree) -> Vec<usize> {
        use self::MergeTree::{Leaf, Node};

        match node {
            Leaf(idx) => {
                order.push(*idx);
                order
            }
            Node(left, right) => match (left.as_ref(), right.as_ref()) {
                (Leaf(l), Leaf(r)) => {
                    order.extend([*l, *r]);
                    order
                }
                (Leaf(l), subtree) => {
                    order.push(*l);
                    order_maker(order, subtree)
                }
                (subtree, Leaf(r)) => {
                    let mut order = order_maker(order, subtree);
                    order.push(*r);
                    order
                }
                (l, r) => order_maker(order_maker(order, l), r),
            },
        }
    }

    order_maker(Vec::new(), tree)
}

/// Turns a distance matrix into a merge tree whose leaves are `0..n`.
pub trait Clusterer {
    fn cluster(&self, matrix: &DistanceMatrix) -> Result<MergeTree>;
}

/// Agglomerative single-linkage clustering.
///
/// Clusters stay in index order. Each round merges the closest pair, the
/// first one found in a row-major scan on ties; the earlier cluster becomes
/// the left subtree and the merged cluster keeps its position.
#[derive(Debug, Clone, Copy, Default)]
pub struct SingleLinkage;

impl Clusterer for SingleLinkage {
    fn cluster(&self, matrix: &DistanceMatrix) -> Result<MergeTree> {
        if matrix.is_empty() {
            return Err(HeatmapError::Collaborator(
                "empty distance matrix".to_string(),
            ));
        }
        if !matrix.is_square() {
            return Err(HeatmapError::Collaborator(
                "distance matrix is not square".to_string(),
            ));
        }

        let mut clusters: Vec<MergeTree> = (0..matrix.size()).map(MergeTree::Leaf).collect();
        let mut dists: Vec<Vec<f64>> = matrix.rows().to_vec();

        while clusters.len() > 1 {
            let k = clusters.len();

            let mut min_dist = f64::INFINITY;
            let mut pair = (0, 1);
            for i in 0..k {
                for j in (i + 1)..k {
                    if dists[i][j] < min_dist {
                        min_dist = dists[i][j];
                        pair = (i, j);
                    }
                }
            }
            let (i, j) = pair;

            // single linkage: the merged cluster is as close as its closest member
            for other in 0..k {
                if other != i && other != j {
                    let d = dists[i][other].min(dists[j][other]);
                    dists[i][other] = d;
                    dists[other][i] = d;
                }
            }
            dists.remove(j);
            for row in dists.iter_mut() {
                row.remove(j);
            }

            let right = clusters.remove(j);
            let left = clusters.remove(i);
            clusters.insert(i, MergeTree::node(left, right));
        }

        Ok(clusters.remove(0))
    }
}
