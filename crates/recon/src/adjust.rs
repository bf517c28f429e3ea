use std::collections::BTreeMap;

use crate::classify::Role;
use crate::model::{
    AdjustmentEntry, AdjustmentReport, Allocation, DivisionSummary, EmployeeMetrics,
};

/// Reconcile per-employee discrepancy totals against externally supplied
/// reference targets.
///
/// For each targeted employee the cross-division discrepancy total is
/// brought to the target exactly, distributing the difference over the
/// divisions in proportion to their share of the original total. This is
/// a reconciliation-to-reference-total step, not a correctness fix: the
/// organization's independent audit count wins, but the division-level
/// breakdown stays proportional.
///
/// Guarantees after the call, for every targeted employee: the sum of
/// division counts equals the target, and no count is negative.
pub fn adjust(
    divisions: &mut [DivisionSummary],
    targets: &BTreeMap<String, i64>,
    fallback_division: Option<&str>,
) -> AdjustmentReport {
    let mut report = AdjustmentReport::default();

    for (employee_id, &target) in targets {
        let entry = adjust_employee(divisions, employee_id, target, fallback_division, &mut report);
        report.entries.push(entry);
    }

    for division in divisions.iter_mut() {
        recompute_total_differences(division);
    }

    report
}

fn adjust_employee(
    divisions: &mut [DivisionSummary],
    employee_id: &str,
    target: i64,
    fallback_division: Option<&str>,
    report: &mut AdjustmentReport,
) -> AdjustmentEntry {
    // (division index, current count) for every division where the
    // employee has a Kerani entry.
    let mut holdings: Vec<(usize, i64)> = Vec::new();
    for (index, division) in divisions.iter().enumerate() {
        if let Some(metrics) = kerani_metrics(division, employee_id) {
            holdings.push((index, metrics.discrepancy_count));
        }
    }

    let original_total: i64 = holdings.iter().map(|(_, count)| count).sum();
    let delta = target - original_total;

    let mut entry = AdjustmentEntry {
        employee_id: employee_id.to_string(),
        original_total,
        target,
        allocations: Vec::new(),
    };

    if delta == 0 {
        return entry;
    }

    let nonzero: Vec<(usize, i64)> = holdings
        .iter()
        .copied()
        .filter(|(_, count)| *count != 0)
        .collect();

    if nonzero.is_empty() {
        // No divisional signal at all: the fallback division takes the
        // full target as a synthetic allocation.
        let index = match resolve_fallback(divisions, fallback_division) {
            Some(index) => index,
            None => {
                report.warnings.push(format!(
                    "employee '{employee_id}': no divisions available for synthetic allocation"
                ));
                return entry;
            }
        };
        set_count(&mut divisions[index], employee_id, target);
        entry.allocations.push(Allocation {
            division_id: divisions[index].division_id.clone(),
            delta,
        });
        return entry;
    }

    let allocations = allocate_proportional(delta, original_total, &nonzero);

    // Apply with a floor of zero, then hand any clamped residual to the
    // divisions with the most room, largest first, so the grand total
    // still lands exactly on the target.
    let mut clamped = false;
    for (index, alloc) in &allocations {
        let current = kerani_metrics(&divisions[*index], employee_id)
            .map(|m| m.discrepancy_count)
            .unwrap_or(0);
        let mut next = current + alloc;
        if next < 0 {
            clamped = true;
            next = 0;
        }
        set_count(&mut divisions[*index], employee_id, next);
    }

    if clamped {
        report.warnings.push(format!(
            "employee '{employee_id}': target {target} required clamping a division at zero"
        ));
        settle_residual(divisions, employee_id, target, &nonzero);
    }

    for (index, alloc) in &allocations {
        entry.allocations.push(Allocation {
            division_id: divisions[*index].division_id.clone(),
            delta: *alloc,
        });
    }
    entry
}

/// Largest-remainder-style split of `delta` across divisions by share of
/// `original_total`: all but the last (sorted descending by share, ties by
/// index) get `round(delta * share)`; the last absorbs the exact
/// remainder. Naive per-division rounding drifts off the target by a
/// bunch or two, which is precisely the defect this replaces.
fn allocate_proportional(
    delta: i64,
    original_total: i64,
    nonzero: &[(usize, i64)],
) -> Vec<(usize, i64)> {
    let mut ordered: Vec<(usize, i64)> = nonzero.to_vec();
    ordered.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

    let mut allocations = Vec::with_capacity(ordered.len());
    let mut allocated = 0i64;
    for (position, (index, count)) in ordered.iter().enumerate() {
        let alloc = if position + 1 == ordered.len() {
            delta - allocated
        } else {
            let share = *count as f64 / original_total as f64;
            (delta as f64 * share).round() as i64
        };
        allocated += alloc;
        allocations.push((*index, alloc));
    }
    allocations
}

/// After clamping, push the employee's total back onto the target by
/// walking divisions in descending count order.
fn settle_residual(
    divisions: &mut [DivisionSummary],
    employee_id: &str,
    target: i64,
    candidates: &[(usize, i64)],
) {
    let mut current_total = 0i64;
    let mut counts: Vec<(usize, i64)> = Vec::new();
    for (index, _) in candidates {
        let count = kerani_metrics(&divisions[*index], employee_id)
            .map(|m| m.discrepancy_count)
            .unwrap_or(0);
        current_total += count;
        counts.push((*index, count));
    }

    let mut residual = target - current_total;
    if residual == 0 {
        return;
    }

    counts.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

    if residual > 0 {
        // All of it fits on the largest division.
        let (index, count) = counts[0];
        set_count(&mut divisions[index], employee_id, count + residual);
    } else {
        for (index, count) in counts {
            if residual == 0 {
                break;
            }
            let take = count.min(-residual);
            set_count(&mut divisions[index], employee_id, count - take);
            residual += take;
        }
    }
}

fn resolve_fallback(
    divisions: &[DivisionSummary],
    fallback_division: Option<&str>,
) -> Option<usize> {
    if let Some(wanted) = fallback_division {
        if let Some(index) = divisions.iter().position(|d| d.division_id == wanted) {
            return Some(index);
        }
    }
    if divisions.is_empty() {
        None
    } else {
        Some(0)
    }
}

fn kerani_metrics<'a>(
    division: &'a DivisionSummary,
    employee_id: &str,
) -> Option<&'a EmployeeMetrics> {
    division
        .employees
        .iter()
        .find(|e| e.role == Role::Kerani && e.employee_id == employee_id)
}

/// Set the employee's Kerani discrepancy count, creating a synthetic
/// entry when the employee never appeared in the division's data.
fn set_count(division: &mut DivisionSummary, employee_id: &str, count: i64) {
    if let Some(metrics) = division
        .employees
        .iter_mut()
        .find(|e| e.role == Role::Kerani && e.employee_id == employee_id)
    {
        metrics.discrepancy_count = count;
        return;
    }
    division.employees.push(EmployeeMetrics {
        employee_id: employee_id.to_string(),
        name: format!("EMPLOYEE-{employee_id}"),
        role: Role::Kerani,
        transaction_count: 0,
        verified_count: 0,
        discrepancy_count: count,
        contribution_pct: 0.0,
    });
}

fn recompute_total_differences(division: &mut DivisionSummary) {
    division.total_differences = division
        .employees
        .iter()
        .filter(|e| e.role == Role::Kerani)
        .map(|e| e.discrepancy_count)
        .sum();
}
