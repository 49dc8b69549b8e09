// Path replacement detection: proposes "this endpoint moved / was
// versioned" pairings between removed and added paths.

use std::collections::BTreeMap;

use crate::changeset::ChangeSet;
use crate::path_normalizer::normalize;

/// Proposes a removed-path → added-path mapping for every removed path that
/// has a structurally equivalent (same normalized form, different raw form)
/// counterpart among the added paths.
///
/// When several added paths qualify for the same removed path, the one with
/// the smallest raw-length distance wins, ties broken by lexicographically
/// smallest added path. Input sets are ordered, so the result is identical
/// across runs regardless of how the diff listed the paths.
///
/// This is a heuristic: the pairing is surfaced as "appears to have moved",
/// never as a certainty.
pub fn detect_replacements(changeset: &ChangeSet) -> BTreeMap<String, String> {
    let mut replacements = BTreeMap::new();

    for removed in &changeset.removed_paths {
        let target = normalize(removed);
        let mut best: Option<(usize, &String)> = None;

        for added in &changeset.added_paths {
            if added == removed || normalize(added) != target {
                continue;
            }
            let distance = removed.len().abs_diff(added.len());
            let better = match best {
                None => true,
                Some((best_distance, best_path)) => {
                    distance < best_distance
                        || (distance == best_distance && added < best_path)
                }
            };
            if better {
                best = Some((distance, added));
            }
        }

        if let Some((_, added)) = best {
            replacements.insert(removed.clone(), added.clone());
        }
    }

    replacements
}
