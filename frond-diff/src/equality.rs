use tracing::debug;

use frond_core::{KeyPath, Value, flatten_one_level, short_type_name};
use frond_path::child_keys;

use crate::support::{LeafPred, child_word, key_set_difference, seq_len, strict_leaf};

/// One point of structural disagreement between two trees.
///
/// `left` and `right` describe what each tree holds at [`path`]; the
/// descriptor renders to a sentence once the caller supplies names for the
/// operands.
///
/// [`path`]: EqualityError::path
#[derive(Clone, Debug)]
pub struct EqualityError {
    /// Where the trees disagree.
    pub path: KeyPath,
    /// Description of the left tree at that point.
    pub left: String,
    /// Description of the right tree at that point.
    pub right: String,
    /// Why they disagree.
    pub explanation: String,
}

impl EqualityError {
    /// Renders the disagreement with caller-supplied operand names.
    pub fn render(&self, left_name: &str, right_name: &str) -> String {
        format!(
            "{left_name}{path} is a {left} but {right_name}{path} is a {right}, so {explanation}",
            path = self.path,
            left = self.left,
            right = self.right,
            explanation = self.explanation,
        )
    }
}

/// The structural disagreements between two trees, one entry per
/// divergence point.
///
/// Empty exactly when the trees share their structure. At each divergence
/// the walk reports the first applicable disagreement and does not descend
/// further, so independent subtree divergences each produce one entry.
/// Leaf values are never compared.
pub fn equality_errors(left: &Value, right: &Value) -> Vec<EqualityError> {
    debug!("diffing tree structures");
    let mut out = Vec::new();
    walk(&KeyPath::new(), left, right, None, &mut out);
    out
}

/// [`equality_errors`] with a caller predicate that turns matching
/// subtrees into leaves on both sides.
pub fn equality_errors_with(
    left: &Value,
    right: &Value,
    is_leaf: impl Fn(&Value) -> bool,
) -> Vec<EqualityError> {
    debug!("diffing tree structures");
    let mut out = Vec::new();
    walk(&KeyPath::new(), left, right, Some(&is_leaf), &mut out);
    out
}

fn walk(
    path: &KeyPath,
    left: &Value,
    right: &Value,
    is_leaf: Option<LeafPred<'_>>,
    out: &mut Vec<EqualityError>,
) {
    if strict_leaf(left, is_leaf) && strict_leaf(right, is_leaf) {
        return;
    }
    if left.type_id() != right.type_id() {
        out.push(EqualityError {
            path: path.clone(),
            left: short_type_name(left.type_name()),
            right: short_type_name(right.type_name()),
            explanation: String::from("their runtime types differ"),
        });
        return;
    }
    if let (Some(left_len), Some(right_len)) = (seq_len(left), seq_len(right)) {
        if left_len != right_len {
            out.push(EqualityError {
                path: path.clone(),
                left: format!("{} of length {left_len}", short_type_name(left.type_name())),
                right: format!("{} of length {right_len}", short_type_name(right.type_name())),
                explanation: String::from("the lengths do not match"),
            });
            return;
        }
    }
    let (Ok((left_children, left_aux)), Ok((right_children, right_aux))) =
        (flatten_one_level(left), flatten_one_level(right))
    else {
        return;
    };
    if left_children.len() != right_children.len() {
        let explanation = match key_set_difference(left, right) {
            Some(difference) => format!(
                "the numbers of children do not match, \
                 with the symmetric difference of key sets: {{{difference}}}",
            ),
            None => String::from("the numbers of children do not match"),
        };
        out.push(EqualityError {
            path: path.clone(),
            left: format!(
                "{} with {} {}",
                short_type_name(left.type_name()),
                left_children.len(),
                child_word(left_children.len()),
            ),
            right: format!(
                "{} with {} {}",
                short_type_name(right.type_name()),
                right_children.len(),
                child_word(right_children.len()),
            ),
            explanation,
        });
        return;
    }
    if left_aux != right_aux {
        out.push(EqualityError {
            path: path.clone(),
            left: format!(
                "{} with node metadata {left_aux:?}",
                short_type_name(left.type_name()),
            ),
            right: format!(
                "{} with node metadata {right_aux:?}",
                short_type_name(right.type_name()),
            ),
            explanation: String::from("the node metadata does not match"),
        });
        return;
    }
    let Some(keys) = child_keys(left) else {
        return;
    };
    for (key, (left_child, right_child)) in keys
        .into_iter()
        .zip(left_children.iter().zip(&right_children))
    {
        walk(&path.with(key), left_child, right_child, is_leaf, out);
    }
}
