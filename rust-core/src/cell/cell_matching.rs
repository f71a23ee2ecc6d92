use log::{debug, warn};
use nalgebra::{Matrix3, Vector3};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::ops::Neg;

use crate::cell::uncenter::uncenter_cell;
use crate::cell::unit_cell::{angle_between, right_handed_vectors, UnitCell};
use crate::config::{AB_MATCH_LENGTH_TOLERANCE, LENGTH_WEIGHT, MAX_CANDIDATES};
use crate::error::CellError;
use crate::Result;

// ======================== TOLERANCES & MODES ========================

/// Matching tolerances: per-axis reciprocal length tolerance (percent) and angle (degrees).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchTolerances {
    pub lengths: [f64; 3],
    pub angle: f64,
}

impl MatchTolerances {
    /// Same length tolerance on all three axes.
    pub fn new(length_percent: f64, angle_degrees: f64) -> Self {
        MatchTolerances {
            lengths: [length_percent; 3],
            angle: angle_degrees,
        }
    }
}

impl Default for MatchTolerances {
    fn default() -> Self {
        MatchTolerances::new(5.0, 1.5)
    }
}

/// Which linear combinations of the indexed reciprocal axes are tried as candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CandidateMode {
    /// ±a*, ±b*, ±c* only: recovers axis permutations and sign flips.
    Direct,
    /// Multipliers {0, ±1/2, ±1, ±2, ±3, ±4} per axis: also covers sub- and super-lattices.
    Reduction,
}

impl CandidateMode {
    /// Multiplier triples in enumeration order, before sign flips.
    fn base_triples(&self) -> Vec<[Multiplier; 3]> {
        // Negative indices mean 1/n, positive mean n, zero means zero
        let (low, high) = match self {
            CandidateMode::Direct => (0, 1),
            CandidateMode::Reduction => (-2, 4),
        };

        let mut triples = Vec::new();
        for n1 in low..=high {
            for n2 in low..=high {
                for n3 in low..=high {
                    if *self == CandidateMode::Direct && n1 + n2 + n3 > 1 {
                        continue;
                    }
                    triples.push([
                        Multiplier::from_index(n1),
                        Multiplier::from_index(n2),
                        Multiplier::from_index(n3),
                    ]);
                }
            }
        }
        triples
    }
}

// ======================== CANDIDATE VECTORS ========================

/// A signed rational multiplier applied to one reciprocal axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Multiplier {
    numerator: i32,
    denominator: i32,
}

impl Multiplier {
    pub fn integer(n: i32) -> Self {
        Multiplier {
            numerator: n,
            denominator: 1,
        }
    }

    /// Index convention of the candidate search: n >= 0 means n, n < 0 means 1/n.
    fn from_index(n: i32) -> Self {
        if n >= 0 {
            Self::integer(n)
        } else {
            Multiplier {
                numerator: -1,
                denominator: -n,
            }
        }
    }

    pub fn numerator(&self) -> i32 {
        self.numerator
    }

    pub fn denominator(&self) -> i32 {
        self.denominator
    }

    pub fn value(&self) -> f64 {
        self.numerator as f64 / self.denominator as f64
    }
}

impl Neg for Multiplier {
    type Output = Multiplier;

    fn neg(self) -> Multiplier {
        Multiplier {
            numerator: -self.numerator,
            denominator: self.denominator,
        }
    }
}

/// A trial reciprocal vector with the multipliers that generated it and its absolute
/// length deviation from the target axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CandidateVector {
    pub vector: Vector3<f64>,
    pub multipliers: [Multiplier; 3],
    pub fom: f64,
}

impl CandidateVector {
    fn same_vector(&self, other: &CandidateVector) -> bool {
        self.multipliers == other.multipliers
    }
}

/// Candidate list with a fixed capacity. Pushing beyond it drops the candidate and marks
/// the list as truncated.
#[derive(Debug, Clone)]
pub struct CandidateList {
    items: Vec<CandidateVector>,
    capacity: usize,
    truncated: bool,
}

impl CandidateList {
    pub fn with_capacity(capacity: usize) -> Self {
        CandidateList {
            items: Vec::with_capacity(capacity),
            capacity,
            truncated: false,
        }
    }

    /// Returns false (and records the overflow) if the list is already full.
    pub fn push(&mut self, candidate: CandidateVector) -> bool {
        if self.items.len() == self.capacity {
            self.truncated = true;
            return false;
        }
        self.items.push(candidate);
        true
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    pub fn as_slice(&self) -> &[CandidateVector] {
        &self.items
    }
}

/// Sign-flip patterns, in enumeration order.
const SIGNS: [[i32; 3]; 8] = [
    [-1, -1, -1],
    [-1, -1, 1],
    [-1, 1, -1],
    [-1, 1, 1],
    [1, -1, -1],
    [1, -1, 1],
    [1, 1, -1],
    [1, 1, 1],
];

/// Whether `value` is within `percent` of `reference`.
pub fn within_tolerance(reference: f64, value: f64, percent: f64) -> bool {
    (value - reference).abs() < (reference * percent / 100.0).abs()
}

/// Collect, for each target length, the combinations of the reciprocal axes of `reciprocal`
/// whose modulus matches it.
pub fn generate_candidates(
    reciprocal: &Matrix3<f64>,
    lengths: &[f64; 3],
    tolerances: &MatchTolerances,
    mode: CandidateMode,
) -> [CandidateList; 3] {
    let mut lists = [
        CandidateList::with_capacity(MAX_CANDIDATES),
        CandidateList::with_capacity(MAX_CANDIDATES),
        CandidateList::with_capacity(MAX_CANDIDATES),
    ];
    let mut seen: HashSet<[Multiplier; 3]> = HashSet::new();

    for base in mode.base_triples() {
        for signs in SIGNS.iter() {
            let multipliers = [
                if signs[0] < 0 { -base[0] } else { base[0] },
                if signs[1] < 0 { -base[1] } else { base[1] },
                if signs[2] < 0 { -base[2] } else { base[2] },
            ];

            // Flipping a zero, or reaching the same value twice, gives nothing new
            if !seen.insert(multipliers) {
                continue;
            }

            let weights = Vector3::new(
                multipliers[0].value(),
                multipliers[1].value(),
                multipliers[2].value(),
            );
            let vector = reciprocal * weights;
            let length = vector.norm();

            for (i, list) in lists.iter_mut().enumerate() {
                if !within_tolerance(lengths[i], length, tolerances.lengths[i]) {
                    continue;
                }
                list.push(CandidateVector {
                    vector,
                    multipliers,
                    fom: (lengths[i] - length).abs(),
                });
            }
        }
    }

    lists
}

// ======================== MATCHING ========================

/// Outcome of a successful [`match_cell`].
#[derive(Debug, Clone)]
pub struct CellMatch {
    /// Cell built from the winning reciprocal axes (triclinic P; classify it if needed)
    pub cell: UnitCell,
    /// Sum of angular deviations (rad) plus weighted length deviations
    pub figure_of_merit: f64,
    /// Multipliers of the indexed cell's primitive reciprocal axes for a*, b*, c*
    pub multipliers: [[Multiplier; 3]; 3],
    /// Candidate list sizes for the three target axes
    pub candidate_counts: [usize; 3],
    /// True if any candidate list hit its capacity
    pub truncated: bool,
}

/// Attempt to make `indexed` fit into `template`.
///
/// Both cells are reduced to primitive form first. Candidates for each template reciprocal
/// axis are generated from the indexed reciprocal basis according to `mode`, then every
/// right-handed triple satisfying the three inter-axial angle tolerances is scored. The
/// lowest figure of merit wins; ties keep the first triple in enumeration order.
///
/// # Errors
/// [`CellError::NotBravais`] if either cell cannot be uncentered, [`CellError::NoMatch`]
/// if no triple satisfies the tolerances.
pub fn match_cell(
    indexed: &UnitCell,
    template: &UnitCell,
    tolerances: &MatchTolerances,
    mode: CandidateMode,
) -> Result<CellMatch> {
    let cell = uncenter_cell(indexed)?;
    let template = uncenter_cell(template)?;

    let [tas, tbs, tcs] = template.reciprocal_vectors();
    let lengths = [tas.norm(), tbs.norm(), tcs.norm()];
    let angles = [
        angle_between(&tbs, &tcs),
        angle_between(&tas, &tcs),
        angle_between(&tas, &tbs),
    ];
    let angtol = tolerances.angle.to_radians();

    let cand = generate_candidates(cell.reciprocal_basis(), &lengths, tolerances, mode);
    let candidate_counts = [cand[0].len(), cand[1].len(), cand[2].len()];
    let truncated = cand.iter().any(|c| c.is_truncated());
    if truncated {
        warn!("Too many cell candidates - consider tightening the unit cell tolerances.");
    }
    debug!(
        "Candidates: {} {} {}",
        candidate_counts[0], candidate_counts[1], candidate_counts[2]
    );

    let mut best: Option<(f64, [&CandidateVector; 3])> = None;

    for c0 in cand[0].as_slice() {
        for c1 in cand[1].as_slice() {
            if c0.same_vector(c1) {
                continue;
            }

            // Angle between axes 0 and 1 should be angle 2
            let ang = angle_between(&c0.vector, &c1.vector);
            if (ang - angles[2]).abs() > angtol {
                continue;
            }
            let fom1 = (ang - angles[2]).abs();

            for c2 in cand[2].as_slice() {
                if c1.same_vector(c2) || c0.same_vector(c2) {
                    continue;
                }

                // Axes 0 and 2 should be separated by angle 1
                let ang = angle_between(&c0.vector, &c2.vector);
                if (ang - angles[1]).abs() > angtol {
                    continue;
                }
                let fom2 = fom1 + (ang - angles[1]).abs();

                // Axes 1 and 2 should be separated by angle 0
                let ang = angle_between(&c1.vector, &c2.vector);
                if (ang - angles[0]).abs() > angtol {
                    continue;
                }

                if !right_handed_vectors(&c0.vector, &c1.vector, &c2.vector) {
                    continue;
                }

                let fom3 = fom2
                    + (ang - angles[0]).abs()
                    + LENGTH_WEIGHT * (c0.fom + c1.fom + c2.fom);

                if best.map_or(true, |(best_fom, _)| fom3 < best_fom) {
                    best = Some((fom3, [c0, c1, c2]));
                }
            }
        }
    }

    let (figure_of_merit, [c0, c1, c2]) = best.ok_or(CellError::NoMatch)?;
    let cell = UnitCell::from_reciprocal_axes(c0.vector, c1.vector, c2.vector)?;

    Ok(CellMatch {
        cell,
        figure_of_merit,
        multipliers: [c0.multipliers, c1.multipliers, c2.multipliers],
        candidate_counts,
        truncated,
    })
}

/// Match assuming the real-space a/b plane of `indexed` is already right.
///
/// Each real-space axis of `indexed` is taken as a if it is within 5 % of the template's
/// a length, or as b likewise (first match wins, each axis used once). The remaining axis
/// becomes c, flipped if needed to keep the cell right-handed.
pub fn match_cell_ab(indexed: &UnitCell, template: &UnitCell) -> Result<UnitCell> {
    let (alen, blen, _) = template.lattice_parameters();
    let params = indexed.direct_vectors();
    let lengths = params.map(|v| v.norm());

    let mut used = [false; 3];
    let mut real_a = None;
    let mut real_b = None;

    for i in 0..3 {
        if within_tolerance(lengths[i], alen, AB_MATCH_LENGTH_TOLERANCE)
            && !used[i]
            && real_a.is_none()
        {
            used[i] = true;
            real_a = Some(params[i]);
        }
        if within_tolerance(lengths[i], blen, AB_MATCH_LENGTH_TOLERANCE)
            && !used[i]
            && real_b.is_none()
        {
            used[i] = true;
            real_b = Some(params[i]);
        }
    }

    let (Some(real_a), Some(real_b)) = (real_a, real_b) else {
        return Err(CellError::NoMatch);
    };

    // "c" is the other one
    let remaining: Vec<Vector3<f64>> = (0..3).filter(|&i| !used[i]).map(|i| params[i]).collect();
    let &[real_c] = remaining.as_slice() else {
        warn!("Couldn't find a unique third vector (matches: {:?})", used);
        return Err(CellError::NoMatch);
    };
    let mut real_c = real_c;

    if !right_handed_vectors(&real_a, &real_b, &real_c) {
        real_c = -real_c;
    }

    UnitCell::from_direct_axes(real_a, real_b, real_c)
}
