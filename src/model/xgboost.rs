//! XGBoost tree ensemble (JSON model format)
//!
//! Reads the document written by `Booster.save_model("model.json")` and
//! evaluates it natively. Only `gbtree` boosters with identity-link
//! regression objectives are supported; the prediction is
//! `base_score + sum(leaf values)`. Thresholds, leaves and the sum are
//! float32, matching the booster, so boundary inputs take the same branch.

use ndarray::{Array1, ArrayView1, ArrayView2};
use serde::Deserialize;

use super::inference::{CollaboratorError, Predictor};
use super::ArtifactError;

const IDENTITY_OBJECTIVES: &[&str] = &[
    "reg:squarederror",
    "reg:linear",
    "reg:absoluteerror",
    "reg:pseudohubererror",
];

// ============================================================================
// JSON DOCUMENT
// ============================================================================

#[derive(Debug, Deserialize)]
struct Document {
    learner: Learner,
}

#[derive(Debug, Deserialize)]
struct Learner {
    learner_model_param: LearnerModelParam,
    gradient_booster: GradientBooster,
    objective: Objective,
}

/// XGBoost stores these as strings, `base_score` sometimes as `"[5E-1]"`
#[derive(Debug, Deserialize)]
struct LearnerModelParam {
    base_score: String,
    #[serde(default)]
    num_feature: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GradientBooster {
    name: String,
    #[serde(default)]
    model: Option<GbTreeModel>,
}

#[derive(Debug, Deserialize)]
struct GbTreeModel {
    trees: Vec<TreeParams>,
}

#[derive(Debug, Deserialize)]
struct Objective {
    name: String,
}

#[derive(Debug, Deserialize)]
struct TreeParams {
    left_children: Vec<i64>,
    right_children: Vec<i64>,
    split_indices: Vec<usize>,
    split_conditions: Vec<f32>,
    default_left: Flags,
}

/// Older releases write `default_left` as 0/1, newer ones as booleans
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Flags {
    Bools(Vec<bool>),
    Ints(Vec<u8>),
}

impl Flags {
    fn into_bools(self) -> Vec<bool> {
        match self {
            Flags::Bools(v) => v,
            Flags::Ints(v) => v.into_iter().map(|b| b != 0).collect(),
        }
    }
}

// ============================================================================
// TREES
// ============================================================================

#[derive(Debug, Clone)]
enum Node {
    Split {
        feature: usize,
        threshold: f32,
        left: usize,
        right: usize,
        default_left: bool,
    },
    Leaf(f32),
}

#[derive(Debug, Clone)]
struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    fn from_params(index: usize, params: TreeParams) -> Result<Self, ArtifactError> {
        let n = params.left_children.len();
        let default_left = params.default_left.into_bools();

        if n == 0
            || params.right_children.len() != n
            || params.split_indices.len() != n
            || params.split_conditions.len() != n
            || default_left.len() != n
        {
            return Err(ArtifactError::Invalid(format!("tree {} has inconsistent node arrays", index)));
        }

        let mut nodes = Vec::with_capacity(n);
        for id in 0..n {
            let (left, right) = (params.left_children[id], params.right_children[id]);

            if left == -1 {
                nodes.push(Node::Leaf(params.split_conditions[id]));
                continue;
            }

            // Children always sit after their parent, which also rules out cycles
            let child = |c: i64| -> Result<usize, ArtifactError> {
                usize::try_from(c)
                    .ok()
                    .filter(|&c| c > id && c < n)
                    .ok_or_else(|| ArtifactError::Invalid(format!("tree {} node {} has bad child {}", index, id, c)))
            };

            nodes.push(Node::Split {
                feature: params.split_indices[id],
                threshold: params.split_conditions[id],
                left: child(left)?,
                right: child(right)?,
                default_left: default_left[id],
            });
        }

        Ok(Self { nodes })
    }

    fn max_feature(&self) -> Option<usize> {
        self.nodes
            .iter()
            .filter_map(|node| match node {
                Node::Split { feature, .. } => Some(*feature),
                Node::Leaf(_) => None,
            })
            .max()
    }

    fn leaf_value(&self, row: ArrayView1<'_, f64>) -> f32 {
        let mut id = 0;
        loop {
            match self.nodes[id] {
                Node::Leaf(value) => return value,
                Node::Split { feature, threshold, left, right, default_left } => {
                    let x = row[feature] as f32;
                    let go_left = if x.is_nan() { default_left } else { x < threshold };
                    id = if go_left { left } else { right };
                }
            }
        }
    }
}

// ============================================================================
// MODEL
// ============================================================================

#[derive(Debug, Clone)]
pub struct XgbModel {
    base_score: f32,
    num_feature: usize,
    trees: Vec<Tree>,
}

impl XgbModel {
    /// `true` when `value` looks like an XGBoost JSON document
    pub fn is_document(value: &serde_json::Value) -> bool {
        value.get("learner").is_some()
    }

    pub fn from_value(value: serde_json::Value) -> Result<Self, ArtifactError> {
        let doc: Document = serde_json::from_value(value)?;
        let learner = doc.learner;

        if !IDENTITY_OBJECTIVES.contains(&learner.objective.name.as_str()) {
            return Err(ArtifactError::Invalid(format!(
                "unsupported objective '{}'",
                learner.objective.name
            )));
        }

        let model = match (learner.gradient_booster.name.as_str(), learner.gradient_booster.model) {
            ("gbtree", Some(model)) => model,
            (name, _) => return Err(ArtifactError::Invalid(format!("unsupported booster '{}'", name))),
        };

        let base_score = parse_param(&learner.learner_model_param.base_score)
            .map(|b| b as f32)
            .ok_or_else(|| ArtifactError::Invalid("invalid base_score".to_string()))?;

        let trees = model
            .trees
            .into_iter()
            .enumerate()
            .map(|(i, params)| Tree::from_params(i, params))
            .collect::<Result<Vec<_>, _>>()?;

        let used = trees.iter().filter_map(Tree::max_feature).max().map_or(0, |m| m + 1);
        let declared = learner
            .learner_model_param
            .num_feature
            .as_deref()
            .and_then(parse_param)
            .map_or(0, |n| n as usize);

        if declared != 0 && used > declared {
            return Err(ArtifactError::Invalid(format!(
                "trees reference feature {} but model declares {} features",
                used - 1,
                declared
            )));
        }

        Ok(Self {
            base_score,
            num_feature: declared.max(used),
            trees,
        })
    }

    pub fn tree_count(&self) -> usize {
        self.trees.len()
    }
}

fn parse_param(raw: &str) -> Option<f64> {
    raw.trim().trim_start_matches('[').trim_end_matches(']').trim().parse().ok()
}

impl Predictor for XgbModel {
    fn n_features(&self) -> Option<usize> {
        (self.num_feature > 0).then_some(self.num_feature)
    }

    fn kind(&self) -> &'static str {
        "xgboost"
    }

    fn predict(&self, batch: ArrayView2<'_, f64>) -> Result<Array1<f64>, CollaboratorError> {
        if batch.ncols() < self.num_feature {
            return Err(format!(
                "feature shape mismatch, expected: {}, got {}",
                self.num_feature,
                batch.ncols()
            )
            .into());
        }

        let out = batch
            .rows()
            .into_iter()
            .map(|row| {
                let margin = self.trees.iter().fold(self.base_score, |acc, t| acc + t.leaf_value(row));
                f64::from(margin)
            })
            .collect();

        Ok(out)
    }
}
