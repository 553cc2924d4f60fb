//! Percentage rebalancing and the ledger consistency check
//!
//! Every component that changes a category's share goes through
//! [`absorb_proportionally`]: locked shares stay put and the remaining
//! ("free") shares absorb the excess or deficit in proportion to their own
//! size. Rounding residue goes to the single largest rebalanced share so the
//! total closes at exactly 100%.

use std::collections::HashSet;

use crate::error::{BudgetError, BudgetResult};
use crate::models::{BudgetCategory, Money, Percentage};

/// How far the category sum may drift from 100% before it is a defect
pub const SUM_TOLERANCE: Percentage = Percentage::from_basis_points(50);

/// How a rebalance closed the total
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rebalance {
    /// Shares already summed to 100%
    Unchanged,
    /// Free shares absorbed the difference; `delta` is how much they grew
    /// (negative when they were reduced)
    Absorbed { delta: Percentage },
    /// Locked shares alone could not be kept; every share was rescaled
    ScaledAll,
}

impl Rebalance {
    /// A human-readable sentence for the rationale notes, if anything moved
    pub fn describe(&self) -> Option<String> {
        match self {
            Self::Unchanged => None,
            Self::Absorbed { delta } if delta.is_zero() => None,
            Self::Absorbed { delta } if delta.is_negative() => Some(format!(
                "Other categories were reduced proportionally by {} in total to keep the budget at 100%.",
                delta.abs_diff(Percentage::zero())
            )),
            Self::Absorbed { delta } => Some(format!(
                "Other categories were increased proportionally by {} in total to keep the budget at 100%.",
                delta
            )),
            Self::ScaledAll => Some(
                "Adjusted costs no longer fit the total budget; every category was rescaled proportionally."
                    .to_string(),
            ),
        }
    }
}

/// Close `shares` to exactly 100%
///
/// `locked[i]` marks shares that must not move. Free shares are scaled by
/// `(100% - locked) / free`. When the locked shares exceed 100% on their own,
/// or there is nothing free to absorb the difference, every share is scaled
/// instead.
pub fn absorb_proportionally(shares: &[Percentage], locked: &[bool]) -> (Vec<Percentage>, Rebalance) {
    debug_assert_eq!(shares.len(), locked.len());

    let total: i64 = shares.iter().map(|p| p.basis_points()).sum();
    let hundred = Percentage::HUNDRED.basis_points();
    if shares.is_empty() || total == hundred {
        return (shares.to_vec(), Rebalance::Unchanged);
    }

    let is_locked = |i: usize| locked.get(i).copied().unwrap_or(false);
    let free: Vec<usize> = (0..shares.len()).filter(|&i| !is_locked(i)).collect();
    let locked_sum: i64 = (0..shares.len())
        .filter(|&i| is_locked(i))
        .map(|i| shares[i].basis_points())
        .sum();
    let free_sum: i64 = free.iter().map(|&i| shares[i].basis_points()).sum();
    let target_free = hundred - locked_sum;

    if !free.is_empty() && target_free >= 0 {
        let mut result = shares.to_vec();
        distribute(&mut result, shares, &free, free_sum, target_free);
        let delta = Percentage::from_basis_points(target_free - free_sum);
        return (result, Rebalance::Absorbed { delta });
    }

    let all: Vec<usize> = (0..shares.len()).collect();
    let mut result = shares.to_vec();
    distribute(&mut result, shares, &all, total, hundred);
    (result, Rebalance::ScaledAll)
}

/// Scale `shares[indices]` so they sum to `target`, writing into `result`
fn distribute(
    result: &mut [Percentage],
    shares: &[Percentage],
    indices: &[usize],
    current: i64,
    target: i64,
) {
    if current <= 0 {
        // Nothing to scale from: split evenly.
        let n = indices.len() as i64;
        for &i in indices {
            result[i] = Percentage::from_basis_points(target / n);
        }
        let residual = target - (target / n) * n;
        if let Some(&first) = indices.first() {
            result[first] += Percentage::from_basis_points(residual);
        }
        return;
    }

    let mut assigned = 0i64;
    for &i in indices {
        let scaled =
            (shares[i].basis_points() as i128 * target as i128 / current as i128) as i64;
        result[i] = Percentage::from_basis_points(scaled);
        assigned += scaled;
    }

    let residual = target - assigned;
    if residual != 0 {
        if let Some(&largest) = indices
            .iter()
            .max_by(|&&a, &&b| shares[a].cmp(&shares[b]).then(b.cmp(&a)))
        {
            result[largest] += Percentage::from_basis_points(residual);
        }
    }
}

/// Rebalance categories in place, rescaling the costs of every share that moved
pub fn rebalance_categories(
    categories: &mut [BudgetCategory],
    locked: &[bool],
    total_budget: Money,
) -> Rebalance {
    let shares: Vec<Percentage> = categories.iter().map(|c| c.percentage).collect();
    let (new_shares, outcome) = absorb_proportionally(&shares, locked);
    for (category, share) in categories.iter_mut().zip(new_shares) {
        if category.percentage != share {
            category.rescale_to(share, total_budget);
        }
    }
    outcome
}

/// The ledger consistency check
///
/// Fails with `InvariantViolation` when the category set is empty, the
/// percentages drift more than [`SUM_TOLERANCE`] from 100%, an id repeats,
/// or any category is internally inconsistent.
pub fn verify_categories(categories: &[BudgetCategory]) -> BudgetResult<()> {
    if categories.is_empty() {
        return Err(BudgetError::InvariantViolation(
            "the budget has no categories".into(),
        ));
    }

    let total: Percentage = categories.iter().map(|c| c.percentage).sum();
    if total.abs_diff(Percentage::HUNDRED) > SUM_TOLERANCE {
        return Err(BudgetError::InvariantViolation(format!(
            "category percentages sum to {} instead of 100%",
            total
        )));
    }

    let mut seen = HashSet::with_capacity(categories.len());
    for category in categories {
        if !seen.insert(&category.id) {
            return Err(BudgetError::InvariantViolation(format!(
                "category id '{}' appears more than once",
                category.id
            )));
        }
        category.validate().map_err(|e| {
            BudgetError::InvariantViolation(format!("category '{}': {}", category.id, e))
        })?;
    }

    Ok(())
}
