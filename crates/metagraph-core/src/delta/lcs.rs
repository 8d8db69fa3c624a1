//! Longest-common-subsequence alignment for positional list diffing.

///
/// Align
///
/// One step of an alignment: indices refer to the old and new lists
/// respectively.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Align {
    Match { old: usize, new: usize },
    Insert { new: usize },
    Remove { old: usize },
}

/// Align two slices under an equivalence. Classic quadratic LCS with the
/// table filled backward; on a tie the walk prefers insertion, so an
/// element that moved reads as inserted at its new position and removed
/// from its old one rather than the reverse.
pub(crate) fn align<T, F>(old: &[T], new: &[T], same: F) -> Vec<Align>
where
    F: Fn(&T, &T) -> bool,
{
    let n = old.len();
    let m = new.len();

    let mut table = vec![vec![0u32; m + 1]; n + 1];
    for i in (0..n).rev() {
        for j in (0..m).rev() {
            table[i][j] = if same(&old[i], &new[j]) {
                table[i + 1][j + 1] + 1
            } else {
                table[i][j + 1].max(table[i + 1][j])
            };
        }
    }

    let mut steps = Vec::new();
    let mut i = 0;
    let mut j = 0;
    while i < n && j < m {
        if same(&old[i], &new[j]) {
            steps.push(Align::Match { old: i, new: j });
            i += 1;
            j += 1;
        } else if table[i][j + 1] >= table[i + 1][j] {
            steps.push(Align::Insert { new: j });
            j += 1;
        } else {
            steps.push(Align::Remove { old: i });
            i += 1;
        }
    }
    while i < n {
        steps.push(Align::Remove { old: i });
        i += 1;
    }
    while j < m {
        steps.push(Align::Insert { new: j });
        j += 1;
    }

    steps
}
