//! Placement engine: seats occupants across rooms, relaxing constraints
//! between attempts.
//!
//! One attempt is a pure function of the layouts, the committed pins, the
//! occupant order, a constraint level and a seat visiting order. The driver
//! in [`place_with_progress`] only picks levels and visiting orders and keeps
//! the best attempt.

use std::collections::{HashMap, HashSet};

use itertools::Itertools;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::{debug, info, warn};

use crate::cache::LayoutCache;
use crate::config::Settings;
use crate::constraint::{level_for_attempt, ConstraintLevel, Traits, Verdict};
use crate::error::{InputError, PlacementError};
use crate::learning::WeightVector;
use crate::model::entity::{Id, Index, Occupant};
use crate::model::result::{AttemptSummary, PlacementResult, Statistics};
use crate::model::room::Room;

const EPSILON: f64 = 1e-12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SeatRef {
    pub room: Index,
    pub seat: Index,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Progress {
    pub percent: u8,
    pub text: String,
}

impl Progress {
    pub fn new(percent: u8, text: impl Into<String>) -> Progress {
        Progress { percent: percent.min(100), text: text.into() }
    }
}

/// Occupant index per seat, per room. Locked seats hold pins.
#[derive(Debug, Clone, PartialEq)]
pub struct Seating {
    pub rooms: Vec<Vec<Option<Index>>>,
    locked: Vec<Vec<bool>>,
}

impl Seating {
    pub fn empty(layouts: &LayoutCache) -> Seating {
        let rooms: Vec<Vec<Option<Index>>> = layouts.rooms.iter().map(|layout| vec![None; layout.numbers.len()]).collect();
        let locked = rooms.iter().map(|seats| vec![false; seats.len()]).collect();
        Seating { rooms, locked }
    }

    pub fn get(&self, at: SeatRef) -> Option<Index> {
        self.rooms.get(at.room)?.get(at.seat).copied().flatten()
    }

    pub fn is_locked(&self, at: SeatRef) -> bool {
        self.locked[at.room][at.seat]
    }

    pub fn pin(&mut self, at: SeatRef, occupant: Index) {
        self.rooms[at.room][at.seat] = Some(occupant);
        self.locked[at.room][at.seat] = true;
    }

    fn set(&mut self, at: SeatRef, occupant: Index) {
        self.rooms[at.room][at.seat] = Some(occupant);
    }

    fn clear(&mut self, at: SeatRef) {
        self.rooms[at.room][at.seat] = None;
    }

    pub fn placed(&self) -> usize {
        self.rooms.iter().flatten().filter(|seat| seat.is_some()).count()
    }
}

/// Outcome of one attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct Attempt {
    pub seating: Seating,
    pub unplaced: Vec<Index>,
}

/// Everything an attempt reads but never changes.
pub struct AttemptContext<'a> {
    pub traits: &'a [Traits],
    pub layouts: &'a LayoutCache,
    pub weights: &'a WeightVector,
    pub repair_budget: usize,
}

fn seated_neighbors<'s>(
    layouts: &'s LayoutCache,
    seating: &'s Seating,
    occupant: Index,
    at: SeatRef,
) -> impl Iterator<Item = Index> + 's {
    layouts.rooms[at.room]
        .neighbors(at.seat)
        .iter()
        .filter_map(move |n| seating.rooms[at.room][*n])
        .filter(move |other| *other != occupant)
}

impl<'a> AttemptContext<'a> {
    pub fn verdict(&self, seating: &Seating, occupant: Index, at: SeatRef) -> Verdict {
        let neighbors = seated_neighbors(self.layouts, seating, occupant, at).map(|n| &self.traits[n]);
        Verdict::judge(&self.traits[occupant], neighbors)
    }

    pub fn fits(&self, seating: &Seating, occupant: Index, at: SeatRef, level: ConstraintLevel) -> bool {
        level.permits(self.verdict(seating, occupant, at))
    }

    /// Soft cost of seating `occupant` at `at`, lower is better.
    pub fn penalty(&self, seating: &Seating, occupant: Index, at: SeatRef) -> f64 {
        let me = &self.traits[occupant];
        let w = self.weights;
        let mut score = 0.0;
        for neighbor in seated_neighbors(self.layouts, seating, occupant, at) {
            let other = &self.traits[neighbor];
            score += w.neighbor_isolation;
            if me.same_gender(other) {
                score += w.gender_balance;
            }
            if me.same_level(other) {
                score += w.cohort_mix;
            }
            if me.special_case || other.special_case {
                score += w.risk_avoidance;
            }
        }
        match (me.special_case, self.layouts.rooms[at.room].accessible[at.seat]) {
            (true, true) => score -= w.risk_avoidance,
            // keep accessible seats for those who need them
            (false, true) => score += w.risk_avoidance / 2.0,
            _ => {}
        }
        score
    }
}

/// Seats every occupant of `order` at the cheapest seat the level allows,
/// then tries to repair whoever is left.
pub fn run_attempt(
    ctx: &AttemptContext,
    base: &Seating,
    order: &[Index],
    level: ConstraintLevel,
    visit: &[SeatRef],
) -> Attempt {
    let mut seating = base.clone();
    let mut unplaced = Vec::new();
    for &occupant in order {
        match best_seat(ctx, &seating, occupant, level, visit) {
            Some(at) => seating.set(at, occupant),
            None => unplaced.push(occupant),
        }
    }
    if !unplaced.is_empty() {
        unplaced = repair(ctx, &mut seating, unplaced, level, visit);
    }
    Attempt { seating, unplaced }
}

fn best_seat(
    ctx: &AttemptContext,
    seating: &Seating,
    occupant: Index,
    level: ConstraintLevel,
    visit: &[SeatRef],
) -> Option<SeatRef> {
    let mut best: Option<(SeatRef, f64)> = None;
    for &at in visit {
        if seating.get(at).is_some() || !ctx.fits(seating, occupant, at, level) {
            continue;
        }
        let score = ctx.penalty(seating, occupant, at);
        if best.map_or(true, |(_, current)| score < current - EPSILON) {
            best = Some((at, score));
        }
    }
    best.map(|(at, _)| at)
}

/// Single-step ejection: lift one seated occupant out, seat the unplaced one,
/// then find the lifted occupant a new seat. Undone when either step fails.
fn repair(
    ctx: &AttemptContext,
    seating: &mut Seating,
    unplaced: Vec<Index>,
    level: ConstraintLevel,
    visit: &[SeatRef],
) -> Vec<Index> {
    let mut budget = ctx.repair_budget;
    let mut remaining = Vec::new();
    for occupant in unplaced {
        if budget == 0 || !relocate(ctx, seating, occupant, level, visit, &mut budget) {
            remaining.push(occupant);
        }
    }
    remaining
}

fn relocate(
    ctx: &AttemptContext,
    seating: &mut Seating,
    occupant: Index,
    level: ConstraintLevel,
    visit: &[SeatRef],
    budget: &mut usize,
) -> bool {
    for &at in visit {
        let Some(blocker) = seating.get(at) else { continue };
        if seating.is_locked(at) {
            continue;
        }
        seating.clear(at);
        if let Some(spot) = first_fit(ctx, seating, occupant, level, visit, budget) {
            seating.set(spot, occupant);
            if let Some(target) = first_fit(ctx, seating, blocker, level, visit, budget) {
                seating.set(target, blocker);
                return true;
            }
            seating.clear(spot);
        }
        seating.set(at, blocker);
        if *budget == 0 {
            return false;
        }
    }
    false
}

/// First empty seat in visiting order the level allows, charging one unit
/// of budget per check.
fn first_fit(
    ctx: &AttemptContext,
    seating: &Seating,
    occupant: Index,
    level: ConstraintLevel,
    visit: &[SeatRef],
    budget: &mut usize,
) -> Option<SeatRef> {
    for &candidate in visit {
        if seating.get(candidate).is_some() {
            continue;
        }
        if *budget == 0 {
            return None;
        }
        *budget -= 1;
        if ctx.fits(seating, occupant, candidate, level) {
            return Some(candidate);
        }
    }
    None
}

/// Rejects malformed records and resolves pins to seat references.
pub fn validate(occupants: &[Occupant], rooms: &[Room]) -> Result<Vec<(Index, SeatRef)>, InputError> {
    let mut room_ids = HashSet::new();
    for room in rooms {
        if !room_ids.insert(room.id) {
            return Err(InputError::DuplicateRoom(room.id));
        }
        let mut seat_ids = HashSet::new();
        let mut positions = HashSet::new();
        for seat in &room.seats {
            if !seat_ids.insert(seat.id) {
                return Err(InputError::DuplicateSeat { room_id: room.id, seat_id: seat.id });
            }
            if !positions.insert((seat.group, seat.row, seat.column)) {
                return Err(InputError::DuplicatePosition {
                    room_id: room.id,
                    group: seat.group,
                    row: seat.row,
                    column: seat.column,
                });
            }
        }
    }

    let mut occupant_ids = HashSet::new();
    let mut claimed: HashMap<SeatRef, Id> = HashMap::new();
    let mut pins = Vec::new();
    for (index, occupant) in occupants.iter().enumerate() {
        if !occupant_ids.insert(occupant.id) {
            return Err(InputError::DuplicateOccupant(occupant.id));
        }
        if !occupant.pinned {
            continue;
        }
        let (room_id, seat_id) = occupant.pin().ok_or(InputError::IncompletePin { occupant_id: occupant.id })?;
        let room = rooms.iter().position(|room| room.id == room_id)
            .ok_or(InputError::UnknownPinRoom { occupant_id: occupant.id, room_id })?;
        let seat = rooms[room].seat_index(seat_id)
            .ok_or(InputError::UnknownPinSeat { occupant_id: occupant.id, room_id, seat_id })?;
        let at = SeatRef { room, seat };
        if let Some(first) = claimed.insert(at, occupant.id) {
            return Err(InputError::PinConflict { room_id, seat_id, first, second: occupant.id });
        }
        pins.push((index, at));
    }
    Ok(pins)
}

/// Unpinned occupants, special cases first, then by cohort and id.
fn general_order(occupants: &[Occupant]) -> Vec<Index> {
    occupants.iter()
        .enumerate()
        .filter(|(_, occupant)| !occupant.pinned)
        .sorted_by(|(_, a), (_, b)| {
            b.special_case.cmp(&a.special_case)
                .then_with(|| a.cohort.cmp(&b.cohort))
                .then_with(|| a.id.cmp(&b.id))
        })
        .map(|(index, _)| index)
        .collect()
}

/// Assignable seats, room by room. Desk order on the first attempt at a
/// level, a seeded shuffle within each room on retries at the same level.
fn visit_order(layouts: &LayoutCache, seed: u64, attempt: usize, canonical: bool) -> Vec<SeatRef> {
    let mut rng = SmallRng::seed_from_u64(seed ^ (attempt as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15));
    layouts.rooms.iter()
        .enumerate()
        .flat_map(|(room, layout)| {
            let mut seats: Vec<SeatRef> = layout.order.iter()
                .filter(|seat| layout.assignable[**seat])
                .map(|&seat| SeatRef { room, seat })
                .collect();
            if !canonical {
                seats.shuffle(&mut rng);
            }
            seats
        })
        .collect()
}

pub fn place(occupants: &[Occupant], rooms: &[Room], settings: &Settings) -> Result<PlacementResult, PlacementError> {
    place_with_progress(occupants, rooms, settings, |_| {})
}

/// Runs up to `settings.max_attempts` attempts and returns the first one that
/// seats everybody, or else the one that seated the most.
pub fn place_with_progress(
    occupants: &[Occupant],
    rooms: &[Room],
    settings: &Settings,
    mut progress: impl FnMut(Progress),
) -> Result<PlacementResult, PlacementError> {
    let pins = validate(occupants, rooms)?;
    progress(Progress::new(5, "input validated"));

    let layouts = LayoutCache::create(rooms, settings);
    let traits: Vec<Traits> = occupants.iter().map(Traits::of).collect();
    let ctx = AttemptContext {
        traits: &traits,
        layouts: &layouts,
        weights: &settings.weights,
        repair_budget: settings.repair_budget,
    };

    let mut base = Seating::empty(&layouts);
    for (occupant, at) in &pins {
        base.pin(*at, *occupant);
    }
    let order = general_order(occupants);
    let max_attempts = settings.max_attempts.max(1);
    info!(
        occupants = occupants.len(),
        pinned = pins.len(),
        rooms = rooms.len(),
        seats = layouts.seat_count(),
        max_attempts,
        "starting placement"
    );

    let mut summaries = Vec::new();
    let mut previous_level = None;
    let mut run = |attempt: usize| -> (Attempt, ConstraintLevel) {
        let level = level_for_attempt(attempt);
        let visit = visit_order(&layouts, settings.seed, attempt, previous_level != Some(level));
        previous_level = Some(level);
        let outcome = run_attempt(&ctx, &base, &order, level, &visit);
        let placed = outcome.seating.placed();
        debug!(attempt, level = level.name(), placed, unplaced = outcome.unplaced.len(), "attempt finished");
        summaries.push(AttemptSummary { attempt, level, placed, unplaced: outcome.unplaced.len() });
        progress(Progress::new(
            (10 + 85 * attempt / max_attempts) as u8,
            format!("attempt {attempt} of {max_attempts} at {}", level.name()),
        ));
        (outcome, level)
    };

    let mut best = run(1);
    for attempt in 2..=max_attempts {
        if best.0.unplaced.is_empty() {
            break;
        }
        let next = run(attempt);
        if next.0.seating.placed() > best.0.seating.placed() {
            best = next;
        }
    }

    let (attempt, level) = best;
    if !attempt.unplaced.is_empty() {
        warn!(
            unplaced = attempt.unplaced.len(),
            level = level.name(),
            "could not seat every occupant"
        );
    }
    let result = build_result(occupants, rooms, &layouts, attempt, level, summaries);
    info!(
        placed = result.statistics.placed,
        unplaced = result.statistics.unplaced,
        level = level.name(),
        "placement finished"
    );
    progress(Progress::new(100, "placement complete"));
    Ok(result)
}

fn build_result(
    occupants: &[Occupant],
    rooms: &[Room],
    layouts: &LayoutCache,
    attempt: Attempt,
    level: ConstraintLevel,
    attempts: Vec<AttemptSummary>,
) -> PlacementResult {
    let rooms = rooms.iter()
        .zip(&layouts.rooms)
        .zip(&attempt.seating.rooms)
        .map(|((room, layout), seated)| {
            let mut room = room.clone();
            for (seat, occupant) in room.seats.iter_mut().zip(seated) {
                seat.occupant = occupant.map(|index| occupants[index].clone());
            }
            room.occupants = layout.order.iter()
                .filter_map(|seat| seated[*seat])
                .map(|index| occupants[index].clone())
                .collect();
            room
        })
        .collect_vec();
    let unplaced_occupants = attempt.unplaced.iter().map(|index| occupants[*index].clone()).collect_vec();
    let statistics = Statistics::new(attempt.seating.placed(), unplaced_occupants.len());
    PlacementResult { rooms, unplaced_occupants, statistics, attempts, final_level: level }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::room::SeatKind;

    fn student(id: Id, cohort: &str, gender: &str) -> Occupant {
        Occupant::new(id, &format!("Name{id}"), "Surname", &format!("{}", 1000 + id), cohort, gender)
    }

    fn crowd(n: u32) -> Vec<Occupant> {
        let cohorts = ["9-A", "10-B", "11-C"];
        (0..n).map(|id| {
            let gender = if id % 2 == 0 { "F" } else { "M" };
            student(id, cohorts[(id % 3) as usize], gender)
        }).collect()
    }

    fn seat_of(result: &PlacementResult, id: Id) -> Option<(Id, Id)> {
        result.rooms.iter().find_map(|room| {
            room.seats.iter()
                .find(|seat| seat.occupant.as_ref().map(|o| o.id) == Some(id))
                .map(|seat| (room.id, seat.id))
        })
    }

    #[test]
    fn test_single_attempt_respects_level() {
        let rooms = vec![Room::grid(1, "A101", &[(1, 3)])];
        let occupants = vec![student(1, "9-A", "A"), student(2, "9-A", "A"), student(3, "9-A", "B")];
        let layouts = LayoutCache::create(&rooms, &Settings::default());
        let traits: Vec<Traits> = occupants.iter().map(Traits::of).collect();
        let weights = WeightVector::default();
        let ctx = AttemptContext { traits: &traits, layouts: &layouts, weights: &weights, repair_budget: 1_000 };
        let base = Seating::empty(&layouts);
        let visit = visit_order(&layouts, 0, 1, true);

        let strict = run_attempt(&ctx, &base, &[0, 1, 2], ConstraintLevel::Strict, &visit);
        assert_eq!(strict.seating.placed(), 2);
        assert_eq!(strict.unplaced, vec![2]);

        let moderate = run_attempt(&ctx, &base, &[0, 1, 2], ConstraintLevel::Moderate, &visit);
        assert!(moderate.unplaced.is_empty());
        assert_eq!(moderate.seating.rooms[0], vec![Some(0), Some(2), Some(1)]);
    }

    #[test]
    fn test_repair_moves_blocker() {
        // 0 1 2 in a row, occupant 0 already in the middle
        let rooms = vec![Room::grid(1, "A101", &[(1, 3)])];
        let occupants = vec![student(1, "9-A", "F"), student(2, "10-A", "F")];
        let layouts = LayoutCache::create(&rooms, &Settings::default());
        let traits: Vec<Traits> = occupants.iter().map(Traits::of).collect();
        let weights = WeightVector::default();
        let ctx = AttemptContext { traits: &traits, layouts: &layouts, weights: &weights, repair_budget: 1_000 };
        let mut seating = Seating::empty(&layouts);
        seating.set(SeatRef { room: 0, seat: 1 }, 0);
        let visit = visit_order(&layouts, 0, 1, true);

        let attempt = run_attempt(&ctx, &seating, &[1], ConstraintLevel::Moderate, &visit);
        assert!(attempt.unplaced.is_empty());
        assert_eq!(attempt.seating.rooms[0], vec![Some(1), None, Some(0)]);
    }

    #[test]
    fn test_repair_never_moves_pins() {
        let rooms = vec![Room::grid(1, "A101", &[(1, 3)])];
        let occupants = vec![student(1, "9-A", "F"), student(2, "10-A", "F")];
        let layouts = LayoutCache::create(&rooms, &Settings::default());
        let traits: Vec<Traits> = occupants.iter().map(Traits::of).collect();
        let weights = WeightVector::default();
        let ctx = AttemptContext { traits: &traits, layouts: &layouts, weights: &weights, repair_budget: 1_000 };
        let mut seating = Seating::empty(&layouts);
        seating.pin(SeatRef { room: 0, seat: 1 }, 0);
        let visit = visit_order(&layouts, 0, 1, true);

        let attempt = run_attempt(&ctx, &seating, &[1], ConstraintLevel::Moderate, &visit);
        assert_eq!(attempt.unplaced, vec![1]);
        assert_eq!(attempt.seating.rooms[0], vec![None, Some(0), None]);
    }

    #[test]
    fn test_result_is_deterministic() {
        let rooms = vec![Room::grid(1, "A101", &[(3, 4)]), Room::grid(2, "B202", &[(2, 3), (2, 3)])];
        let occupants = crowd(30);
        let settings = Settings { seed: 42, ..Settings::default() };
        let first = place(&occupants, &rooms, &settings).unwrap();
        let second = place(&occupants, &rooms, &settings).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_seats_unique_and_constraints_hold() {
        let rooms = vec![Room::grid(1, "A101", &[(4, 5)]), Room::grid(2, "B202", &[(3, 4)])];
        let occupants = crowd(26);
        let settings = Settings::default();
        let result = place(&occupants, &rooms, &settings).unwrap();

        let ids: Vec<Id> = result.seated().map(|(_, o)| o.id).collect();
        assert_eq!(ids.len(), ids.iter().unique().count());
        assert_eq!(result.statistics.placed + result.statistics.unplaced, occupants.len());

        let layouts = LayoutCache::create(&result.rooms, &settings);
        for (room, layout) in result.rooms.iter().zip(&layouts.rooms) {
            for (index, seat) in room.seats.iter().enumerate() {
                let Some(occupant) = &seat.occupant else { continue };
                let neighbors: Vec<&Occupant> = layout.neighbors(index).iter()
                    .filter_map(|n| room.seats[*n].occupant.as_ref())
                    .collect();
                let verdict = crate::constraint::evaluate(occupant, &neighbors);
                assert!(result.final_level.permits(verdict), "violation at seat {}", seat.id);
            }
        }
    }

    #[test]
    fn test_pins_and_blocked_seats() {
        let mut rooms = vec![Room::grid(1, "A101", &[(2, 3)])];
        rooms[0].seats[0].kind = SeatKind::Blocked;
        let mut occupants = crowd(4);
        occupants[3] = occupants[3].clone().pinned_to(1, 4);
        let result = place(&occupants, &rooms, &Settings::default()).unwrap();

        assert_eq!(seat_of(&result, 3), Some((1, 4)));
        assert!(result.rooms[0].seats[0].occupant.is_none());
        assert_eq!(result.rooms[0].occupants.len(), result.statistics.placed);
    }

    #[test]
    fn test_special_case_takes_accessible_seat() {
        let mut rooms = vec![Room::grid(1, "A101", &[(1, 3)])];
        rooms[0].seats[2].kind = SeatKind::Accessible;
        let occupants = vec![student(1, "9-A", "F"), student(2, "10-A", "M").special()];
        let result = place(&occupants, &rooms, &Settings::default()).unwrap();

        assert_eq!(seat_of(&result, 2), Some((1, 2)));
        assert_eq!(seat_of(&result, 1), Some((1, 0)));
    }

    #[test]
    fn test_capacity_exhaustion_is_not_an_error() {
        let rooms = vec![Room::grid(1, "A101", &[(1, 2)])];
        let occupants = crowd(5);
        let result = place(&occupants, &rooms, &Settings::default()).unwrap();
        assert_eq!(result.statistics.placed, 2);
        assert_eq!(result.statistics.unplaced, 3);
        assert_eq!(result.unplaced_occupants.len(), 3);
        assert_eq!(result.attempts.len(), 5);
        assert!((result.statistics.success_rate_percent - 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_invalid_input_aborts() {
        let rooms = vec![Room::grid(1, "A101", &[(1, 2)])];
        let mut occupants = crowd(3);
        occupants[2].id = 0;
        assert_eq!(
            place(&occupants, &rooms, &Settings::default()),
            Err(PlacementError::Input(InputError::DuplicateOccupant(0)))
        );

        let occupants = vec![student(1, "9-A", "F").pinned_to(1, 9)];
        assert_eq!(
            validate(&occupants, &rooms),
            Err(InputError::UnknownPinSeat { occupant_id: 1, room_id: 1, seat_id: 9 })
        );

        let occupants = vec![student(1, "9-A", "F").pinned_to(1, 0), student(2, "9-A", "M").pinned_to(1, 0)];
        assert_eq!(
            validate(&occupants, &rooms),
            Err(InputError::PinConflict { room_id: 1, seat_id: 0, first: 1, second: 2 })
        );

        let occupants = vec![student(1, "9-A", "F").pinned_to(4, 0)];
        assert_eq!(
            validate(&occupants, &rooms),
            Err(InputError::UnknownPinRoom { occupant_id: 1, room_id: 4 })
        );

        let mut loose = student(1, "9-A", "F");
        loose.pinned = true;
        assert_eq!(validate(&[loose], &rooms), Err(InputError::IncompletePin { occupant_id: 1 }));
    }

    #[test]
    fn test_malformed_rooms_rejected() {
        let occupants = crowd(2);
        let twins = vec![Room::grid(1, "A101", &[(1, 2)]), Room::grid(1, "B202", &[(1, 2)])];
        assert_eq!(validate(&occupants, &twins), Err(InputError::DuplicateRoom(1)));

        let mut room = Room::grid(1, "A101", &[(1, 2)]);
        room.seats[1].id = 0;
        assert_eq!(
            validate(&occupants, &[room]),
            Err(InputError::DuplicateSeat { room_id: 1, seat_id: 0 })
        );

        let mut room = Room::grid(1, "A101", &[(1, 2)]);
        room.seats[1].column = 0;
        assert_eq!(
            place(&occupants, &[room], &Settings::default()),
            Err(PlacementError::Input(InputError::DuplicatePosition { room_id: 1, group: 0, row: 0, column: 0 }))
        );
    }

    #[test]
    fn test_progress_reported_until_done() {
        let rooms = vec![Room::grid(1, "A101", &[(2, 2)])];
        let mut updates = Vec::new();
        place_with_progress(&crowd(2), &rooms, &Settings::default(), |p| updates.push(p.percent)).unwrap();
        assert_eq!(updates.first(), Some(&5));
        assert_eq!(updates.last(), Some(&100));
        assert!(updates.windows(2).all(|pair| pair[0] <= pair[1]));
    }
}
