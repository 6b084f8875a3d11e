//! Dependency-list merging
//!
//! A base type and an enhancement type each declare an ordered list of
//! dependency tokens. [`merge`] produces the combined list a composed type
//! advertises, plus the positional re-split operations that recover each
//! side's constructor arguments from one resolved-value list.
//!
//! The combined list is the base's list followed by the enhancement tokens
//! not already present, in enhancement-declaration order. A token requested
//! by both sides collapses to the base's position, so both constructors see
//! the same resolved value.

use graft_core::Token;
use rustc_hash::FxHashMap;

/// Result of merging two dependency-token lists.
///
/// Deterministic for the same inputs: merging twice yields the same combined
/// order and the same split positions.
#[derive(Debug, Clone)]
pub struct MergedDependencies {
    combined: Vec<Token>,
    base_len: usize,
    enh_positions: Vec<usize>,
}

/// Merge a base token list with an enhancement token list.
pub fn merge(base_tokens: &[Token], enh_tokens: &[Token]) -> MergedDependencies {
    let mut combined: Vec<Token> = base_tokens.to_vec();
    let mut index: FxHashMap<Token, usize> = combined
        .iter()
        .cloned()
        .enumerate()
        .map(|(position, token)| (token, position))
        .collect();

    let mut enh_positions = Vec::with_capacity(enh_tokens.len());
    for token in enh_tokens {
        let position = match index.get(token) {
            Some(&position) => position,
            None => {
                let position = combined.len();
                combined.push(token.clone());
                index.insert(token.clone(), position);
                position
            }
        };
        enh_positions.push(position);
    }

    MergedDependencies {
        combined,
        base_len: base_tokens.len(),
        enh_positions,
    }
}

impl MergedDependencies {
    /// The combined token list, in combined order
    pub fn combined(&self) -> &[Token] {
        &self.combined
    }

    /// Number of tokens the base declared
    pub fn base_len(&self) -> usize {
        self.base_len
    }

    /// Number of tokens the enhancement declared
    pub fn enh_len(&self) -> usize {
        self.enh_positions.len()
    }

    /// Recover the base's constructor arguments: the declared-size prefix.
    ///
    /// `values` must be positionally aligned to [`combined`](Self::combined),
    /// one value per combined token.
    pub fn split_for_base<T: Clone>(&self, values: &[T]) -> Vec<T> {
        values[..self.base_len].to_vec()
    }

    /// Recover the enhancement's constructor arguments: for each enhancement
    /// token in declared order, the value at that token's combined position.
    ///
    /// `values` must be positionally aligned to [`combined`](Self::combined),
    /// one value per combined token.
    pub fn split_for_enh<T: Clone>(&self, values: &[T]) -> Vec<T> {
        self.enh_positions
            .iter()
            .map(|&position| values[position].clone())
            .collect()
    }
}
