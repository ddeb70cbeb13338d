//! Token-level word diffing of aligned leaf pairs
//!
//! For a paired-but-unequal leaf pair, both texts are tokenized on
//! whitespace and a Myers O(ND) diff runs over the token sequences,
//! yielding word-granular insert/delete/equal opcodes. A semantic cleanup
//! pass then folds short equal runs trapped between edits into the edits
//! around them, so a heavily reworded sentence reads as one coherent
//! replacement instead of confetti.
//!
//! The result is rendered as two inline-markup strings: the archived side
//! carries `removed` spans, the current side `added` spans, equal tokens
//! appear bare in both, and spans are joined by single spaces.

use crate::dom::escape_text;
use crate::error::{PalimpsestError, Result};
use crate::types::{DiffSpan, SpanKind};

/// Equal runs of at most this many tokens, trapped between edits no
/// smaller than themselves, are folded into the surrounding edits.
/// Heuristic, borrowed from semantic cleanup in character-level diff
/// engines and applied at word granularity.
const SEMANTIC_FOLD_TOKENS: usize = 2;

/// Word-level diff of one leaf pair, ready for rendering
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordDiff {
    /// Spans of the archived side (`Equal` and `Removed` only)
    pub archived: Vec<DiffSpan>,
    /// Spans of the current side (`Equal` and `Added` only)
    pub current: Vec<DiffSpan>,
}

impl WordDiff {
    /// Render the archived side as inline markup
    pub fn archived_html(&self) -> String {
        render_spans(&self.archived)
    }

    /// Render the current side as inline markup
    pub fn current_html(&self) -> String {
        render_spans(&self.current)
    }
}

fn render_spans(spans: &[DiffSpan]) -> String {
    spans
        .iter()
        .map(|span| match span.kind.css_class() {
            None => escape_text(&span.text),
            Some(class) => format!(
                "<span class=\"{}\">{}</span>",
                class,
                escape_text(&span.text)
            ),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Intermediate opcode stream: equal runs alternating with edit groups
#[derive(Debug)]
enum Piece {
    Equal(Vec<String>),
    Edit {
        removed: Vec<String>,
        added: Vec<String>,
    },
}

fn edit_len(piece: &Piece) -> usize {
    match piece {
        Piece::Equal(_) => 0,
        Piece::Edit { removed, added } => removed.len() + added.len(),
    }
}

/// Compute the word-level diff of one leaf pair
///
/// `max_tokens` bounds each side; a pair over budget returns
/// [`PalimpsestError::WordDiffOverflow`], which the comparison engine
/// absorbs by demoting the pair to a whole-leaf removal/addition.
pub fn diff_words(archived: &str, current: &str, max_tokens: usize) -> Result<WordDiff> {
    let old: Vec<&str> = archived.split_whitespace().collect();
    let new: Vec<&str> = current.split_whitespace().collect();
    if old.len() > max_tokens || new.len() > max_tokens {
        return Err(PalimpsestError::WordDiffOverflow {
            archived_tokens: old.len(),
            current_tokens: new.len(),
            limit: max_tokens,
        });
    }

    let (keep_old, keep_new) = myers_keep_masks(&old, &new);
    let pieces = collect_pieces(&old, &new, &keep_old, &keep_new);
    let pieces = fold_short_equalities(pieces);
    Ok(assemble(pieces))
}

/// Myers O(ND) shortest-edit-script search over token slices
///
/// Returns per-token "kept" masks; a token is kept when it belongs to the
/// common subsequence of the two sequences.
fn myers_keep_masks(old: &[&str], new: &[&str]) -> (Vec<bool>, Vec<bool>) {
    let n = old.len() as isize;
    let m = new.len() as isize;
    let mut keep_old = vec![false; old.len()];
    let mut keep_new = vec![false; new.len()];

    let max = (n + m) as usize;
    let offset = max as isize;
    let mut v = vec![0isize; 2 * max + 1];
    let mut trace: Vec<Vec<isize>> = Vec::new();

    'search: for d in 0..=max as isize {
        // Snapshot before expanding depth d; used by the backtrack below
        trace.push(v.clone());
        let mut k = -d;
        while k <= d {
            let mut x = if k == -d || (k != d && v[(k - 1 + offset) as usize] < v[(k + 1 + offset) as usize])
            {
                v[(k + 1 + offset) as usize]
            } else {
                v[(k - 1 + offset) as usize] + 1
            };
            let mut y = x - k;
            while x < n && y < m && old[x as usize] == new[y as usize] {
                x += 1;
                y += 1;
            }
            v[(k + offset) as usize] = x;
            if x >= n && y >= m {
                break 'search;
            }
            k += 2;
        }
    }

    let mut x = n;
    let mut y = m;
    for d in (1..trace.len()).rev() {
        let v = &trace[d];
        let di = d as isize;
        let k = x - y;
        let prev_k = if k == -di || (k != di && v[(k - 1 + offset) as usize] < v[(k + 1 + offset) as usize])
        {
            k + 1
        } else {
            k - 1
        };
        let prev_x = v[(prev_k + offset) as usize];
        let prev_y = prev_x - prev_k;
        while x > prev_x && y > prev_y {
            keep_old[(x - 1) as usize] = true;
            keep_new[(y - 1) as usize] = true;
            x -= 1;
            y -= 1;
        }
        if x == prev_x {
            y -= 1;
        } else {
            x -= 1;
        }
    }
    // Depth 0 is a pure leading snake
    while x > 0 && y > 0 {
        keep_old[(x - 1) as usize] = true;
        keep_new[(y - 1) as usize] = true;
        x -= 1;
        y -= 1;
    }

    (keep_old, keep_new)
}

/// Walk both token lists and the keep masks into an opcode stream
fn collect_pieces(
    old: &[&str],
    new: &[&str],
    keep_old: &[bool],
    keep_new: &[bool],
) -> Vec<Piece> {
    let mut pieces = Vec::new();
    let mut i = 0;
    let mut j = 0;
    while i < old.len() || j < new.len() {
        let removed_start = i;
        while i < old.len() && !keep_old[i] {
            i += 1;
        }
        let added_start = j;
        while j < new.len() && !keep_new[j] {
            j += 1;
        }
        if i > removed_start || j > added_start {
            pieces.push(Piece::Edit {
                removed: old[removed_start..i].iter().map(|t| t.to_string()).collect(),
                added: new[added_start..j].iter().map(|t| t.to_string()).collect(),
            });
        }
        let equal_start = i;
        while i < old.len() && j < new.len() && keep_old[i] && keep_new[j] {
            i += 1;
            j += 1;
        }
        if i > equal_start {
            pieces.push(Piece::Equal(
                old[equal_start..i].iter().map(|t| t.to_string()).collect(),
            ));
        }
    }
    pieces
}

/// Semantic cleanup: fold short equal runs flanked by edits into the
/// edits on both sides, merging the two edit groups into one
fn fold_short_equalities(pieces: Vec<Piece>) -> Vec<Piece> {
    let mut out: Vec<Piece> = Vec::with_capacity(pieces.len());
    for piece in pieces {
        match piece {
            Piece::Equal(eq) => {
                if eq.is_empty() {
                    continue;
                }
                if let Some(Piece::Equal(prev)) = out.last_mut() {
                    prev.extend(eq);
                } else {
                    out.push(Piece::Equal(eq));
                }
            }
            Piece::Edit { removed, added } => {
                let incoming = removed.len() + added.len();
                let foldable = out.len() >= 2
                    && matches!(&out[out.len() - 1],
                        Piece::Equal(eq) if eq.len() <= SEMANTIC_FOLD_TOKENS
                            && eq.len() <= edit_len(&out[out.len() - 2])
                            && eq.len() <= incoming)
                    && matches!(&out[out.len() - 2], Piece::Edit { .. });
                if foldable {
                    let Some(Piece::Equal(eq)) = out.pop() else {
                        unreachable!()
                    };
                    let Some(Piece::Edit {
                        removed: mut prev_removed,
                        added: mut prev_added,
                    }) = out.pop()
                    else {
                        unreachable!()
                    };
                    prev_removed.extend(eq.iter().cloned());
                    prev_removed.extend(removed);
                    prev_added.extend(eq);
                    prev_added.extend(added);
                    out.push(Piece::Edit {
                        removed: prev_removed,
                        added: prev_added,
                    });
                } else if let Some(Piece::Edit {
                    removed: prev_removed,
                    added: prev_added,
                }) = out.last_mut()
                {
                    prev_removed.extend(removed);
                    prev_added.extend(added);
                } else {
                    out.push(Piece::Edit { removed, added });
                }
            }
        }
    }
    out
}

/// Split the opcode stream into the two per-side span sequences
fn assemble(pieces: Vec<Piece>) -> WordDiff {
    let mut archived = Vec::new();
    let mut current = Vec::new();
    for piece in pieces {
        match piece {
            Piece::Equal(tokens) => {
                let text = tokens.join(" ");
                archived.push(DiffSpan::new(SpanKind::Equal, text.clone()));
                current.push(DiffSpan::new(SpanKind::Equal, text));
            }
            Piece::Edit { removed, added } => {
                if !removed.is_empty() {
                    archived.push(DiffSpan::new(SpanKind::Removed, removed.join(" ")));
                }
                if !added.is_empty() {
                    current.push(DiffSpan::new(SpanKind::Added, added.join(" ")));
                }
            }
        }
    }
    WordDiff { archived, current }
}
