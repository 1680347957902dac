//! Allocation optimizer: spreads one week's target hours across staff.
//!
//! Every optimization mode maps to a pure strategy function with the same
//! shape: `(pool, target, allow_overallocation) -> hours per pool slot`.
//! The shared tail (`summarize`) turns those hours into an
//! `AllocationResult`. Strategies never look at other weeks.
//!
//! Ordering is fully deterministic: ties on every ranking key fall back to
//! the staff id, compared lexically.

use crate::{
    mode::OptimizationMode,
    types::{Hours, OfficeId, StaffId},
};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Amounts at or below this are treated as zero.
pub const HOURS_EPSILON: Hours = 1e-9;

/// Office key used to group staff with no office.
const UNASSIGNED_OFFICE: &str = "unknown";

/// One staff member's room in one simulated week.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaffCapacitySlice {
    pub id: StaffId,
    pub office_id: Option<OfficeId>,
    /// Headroom before any overallocation.
    pub free_at_100: Hours,
    /// Headroom up to the configured overallocation ceiling.
    pub free_at_cap: Hours,
    pub effective_capacity: Hours,
    pub committed_hours: Hours,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaffAllocation {
    pub staff_id: StaffId,
    pub hours: Hours,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct AllocationResult {
    pub achievable_hours: Hours,
    pub allocated_staff_count: usize,
    pub allocated_staff_ids: Vec<StaffId>,
    pub overallocated_staff_ids: Vec<StaffId>,
    pub overallocated_hours: Hours,
    /// Nonzero assignments, in pool order.
    pub allocations: Vec<StaffAllocation>,
}

/// Hours assigned to each pool slot, indexed like the pool.
type Assigned = Vec<Hours>;

type Strategy = fn(&[StaffCapacitySlice], Hours, bool) -> Assigned;

fn strategy_for(mode: OptimizationMode) -> Strategy {
    match mode {
        m if m.is_conservative() => fill_conservatively,
        OptimizationMode::SingleOfficePreferred => fill_preferred_office,
        OptimizationMode::MultiOfficeBalanced => fill_balanced_across_offices,
        // Biggest-room-first already minimises headcount within one week.
        _ => fill_by_room,
    }
}

/// Allocate `target_hours` across `pool` according to `mode`.
pub fn allocate_for_mode(
    mode: OptimizationMode,
    pool: &[StaffCapacitySlice],
    target_hours: Hours,
    allow_overallocation: bool,
) -> AllocationResult {
    let assigned = if target_hours > HOURS_EPSILON && !pool.is_empty() {
        strategy_for(mode)(pool, target_hours, allow_overallocation)
    } else {
        vec![0.0; pool.len()]
    };
    summarize(pool, &assigned)
}

// ── Ranking ────────────────────────────────────────────────────

fn by_id(pool: &[StaffCapacitySlice], a: usize, b: usize) -> Ordering {
    pool[a].id.cmp(&pool[b].id)
}

fn by_room_desc(pool: &[StaffCapacitySlice], a: usize, b: usize) -> Ordering {
    pool[b]
        .free_at_cap
        .total_cmp(&pool[a].free_at_cap)
        .then_with(|| by_id(pool, a, b))
}

fn rank_by_room(pool: &[StaffCapacitySlice]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..pool.len()).collect();
    order.sort_by(|&a, &b| by_room_desc(pool, a, b));
    order
}

/// Office with the greatest summed `free_at_cap`. Staff without an office
/// never win; ties go to the lexically smallest office id.
pub fn preferred_office(pool: &[StaffCapacitySlice]) -> Option<&str> {
    let mut totals: BTreeMap<&str, Hours> = BTreeMap::new();
    for member in pool {
        if let Some(office) = member.office_id.as_deref() {
            *totals.entry(office).or_insert(0.0) += member.free_at_cap;
        }
    }
    let mut winner: Option<(&str, Hours)> = None;
    for (office, total) in totals {
        if winner.map_or(true, |(_, best)| total > best) {
            winner = Some((office, total));
        }
    }
    winner.map(|(office, _)| office)
}

// ── Strategies ─────────────────────────────────────────────────

/// Walk `order`, giving each candidate up to `room(slot) - already` hours.
fn greedy_fill(
    pool: &[StaffCapacitySlice],
    order: &[usize],
    room: impl Fn(&StaffCapacitySlice) -> Hours,
    remaining: &mut Hours,
    assigned: &mut Assigned,
) {
    for &slot in order {
        if *remaining <= HOURS_EPSILON {
            break;
        }
        let left = (room(&pool[slot]) - assigned[slot]).max(0.0);
        let take = left.min(*remaining);
        if take > 0.0 {
            assigned[slot] += take;
            *remaining -= take;
        }
    }
}

fn fill_by_room(pool: &[StaffCapacitySlice], target: Hours, _allow: bool) -> Assigned {
    let mut assigned = vec![0.0; pool.len()];
    let mut remaining = target;
    greedy_fill(pool, &rank_by_room(pool), |s| s.free_at_cap, &mut remaining, &mut assigned);
    assigned
}

fn fill_preferred_office(pool: &[StaffCapacitySlice], target: Hours, _allow: bool) -> Assigned {
    let preferred = preferred_office(pool);
    let in_preferred = |slot: usize| preferred.is_some() && pool[slot].office_id.as_deref() == preferred;

    let mut order: Vec<usize> = (0..pool.len()).collect();
    order.sort_by(|&a, &b| {
        in_preferred(b)
            .cmp(&in_preferred(a))
            .then_with(|| by_room_desc(pool, a, b))
    });

    let mut assigned = vec![0.0; pool.len()];
    let mut remaining = target;
    greedy_fill(pool, &order, |s| s.free_at_cap, &mut remaining, &mut assigned);
    assigned
}

fn fill_balanced_across_offices(pool: &[StaffCapacitySlice], target: Hours, _allow: bool) -> Assigned {
    let mut assigned = vec![0.0; pool.len()];

    let mut offices: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
    for (slot, member) in pool.iter().enumerate() {
        let key = member.office_id.as_deref().unwrap_or(UNASSIGNED_OFFICE);
        offices.entry(key).or_default().push(slot);
    }
    for members in offices.values_mut() {
        members.sort_by(|&a, &b| by_room_desc(pool, a, b));
    }

    let office_room = |members: &[usize]| -> Hours {
        members.iter().map(|&slot| pool[slot].free_at_cap.max(0.0)).sum()
    };
    let total_room: Hours = offices.values().map(|m| office_room(m.as_slice())).sum();
    if total_room <= HOURS_EPSILON {
        return assigned;
    }

    let mut remaining = target;
    for members in offices.values() {
        if remaining <= HOURS_EPSILON {
            break;
        }
        let share = target * office_room(members.as_slice()) / total_room;
        let mut office_remaining = remaining.min(share);
        let before = office_remaining;
        greedy_fill(pool, members, |s| s.free_at_cap, &mut office_remaining, &mut assigned);
        remaining -= before - office_remaining;
    }

    // Mop up anything proportional rounding left behind.
    if remaining > HOURS_EPSILON {
        greedy_fill(pool, &rank_by_room(pool), |s| s.free_at_cap, &mut remaining, &mut assigned);
    }
    assigned
}

/// Rank by room before overallocation, take at most half of each person's
/// overallocation headroom, then fall back to a biggest-room sweep.
fn fill_conservatively(pool: &[StaffCapacitySlice], target: Hours, allow: bool) -> Assigned {
    let mut order: Vec<usize> = (0..pool.len()).collect();
    order.sort_by(|&a, &b| {
        pool[b]
            .free_at_100
            .total_cmp(&pool[a].free_at_100)
            .then_with(|| by_room_desc(pool, a, b))
    });

    let conservative_room = |s: &StaffCapacitySlice| -> Hours {
        let headroom = if allow {
            (s.free_at_cap - s.free_at_100).max(0.0) * 0.5
        } else {
            0.0
        };
        s.free_at_100 + headroom
    };

    let mut assigned = vec![0.0; pool.len()];
    let mut remaining = target;
    greedy_fill(pool, &order, conservative_room, &mut remaining, &mut assigned);
    if remaining > HOURS_EPSILON {
        greedy_fill(pool, &rank_by_room(pool), |s| s.free_at_cap, &mut remaining, &mut assigned);
    }
    assigned
}

// ── Summary ────────────────────────────────────────────────────

fn summarize(pool: &[StaffCapacitySlice], assigned: &[Hours]) -> AllocationResult {
    let mut result = AllocationResult::default();
    for (member, &hours) in pool.iter().zip(assigned) {
        result.achievable_hours += hours;
        if hours > HOURS_EPSILON {
            result.allocated_staff_ids.push(member.id.clone());
            result.allocations.push(StaffAllocation {
                staff_id: member.id.clone(),
                hours,
            });
        }
        let over = (member.committed_hours + hours - member.effective_capacity).max(0.0);
        if over > HOURS_EPSILON {
            result.overallocated_staff_ids.push(member.id.clone());
            result.overallocated_hours += over;
        }
    }
    result.allocated_staff_count = result.allocated_staff_ids.len();
    result
}
