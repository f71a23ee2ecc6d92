use std::collections::btree_map::{self, BTreeMap};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::cell::UnitCell;
use crate::interfaces::DetectorPosition;

// ======================== MILLER INDEX ========================

/// Integer Miller indices, ordered lexicographically by (h, k, l).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MillerIndex {
    pub h: i32,
    pub k: i32,
    pub l: i32,
}

impl MillerIndex {
    pub fn new(h: i32, k: i32, l: i32) -> Self {
        MillerIndex { h, k, l }
    }

    pub fn is_origin(&self) -> bool {
        self.h == 0 && self.k == 0 && self.l == 0
    }
}

impl From<(i32, i32, i32)> for MillerIndex {
    fn from((h, k, l): (i32, i32, i32)) -> Self {
        MillerIndex { h, k, l }
    }
}

impl fmt::Display for MillerIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:4} {:4} {:4}", self.h, self.k, self.l)
    }
}

// ======================== REFLECTION ========================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reflection {
    indices: MillerIndex,
    /// Indices of the asymmetric-unit representative this reflection merges into
    pub symmetric_indices: MillerIndex,
    /// Excitation error for the largest Ewald sphere (m^-1)
    pub r_low: f64,
    /// Excitation error for the smallest Ewald sphere (m^-1)
    pub r_high: f64,
    pub partiality: f64,
    pub lorentz: f64,
    pub detector_position: Option<DetectorPosition>,
    pub intensity: f64,
    pub esd: f64,
    /// Number of observations; zero marks a reflection that is not currently excited
    pub redundancy: u32,
}

impl Reflection {
    pub fn new(indices: MillerIndex) -> Self {
        Reflection {
            indices,
            symmetric_indices: indices,
            r_low: 0.0,
            r_high: 0.0,
            partiality: 0.0,
            lorentz: 1.0,
            detector_position: None,
            intensity: 0.0,
            esd: 0.0,
            redundancy: 0,
        }
    }

    pub fn indices(&self) -> MillerIndex {
        self.indices
    }

    /// Set excitation errors and partiality together.
    pub fn set_partial(&mut self, r_low: f64, r_high: f64, partiality: f64) {
        self.r_low = r_low;
        self.r_high = r_high;
        self.partiality = partiality;
    }
}

// ======================== REFLECTION LIST ========================

/// Reflections keyed and iterated in Miller-index order.
///
/// Serialized as a plain sequence of reflections.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<Reflection>", into = "Vec<Reflection>")]
pub struct ReflectionList {
    reflections: BTreeMap<MillerIndex, Reflection>,
}

impl ReflectionList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Entry for (h, k, l), created empty if absent.
    pub fn add(&mut self, h: i32, k: i32, l: i32) -> &mut Reflection {
        let index = MillerIndex::new(h, k, l);
        self.reflections
            .entry(index)
            .or_insert_with(|| Reflection::new(index))
    }

    /// Store a complete reflection, returning any entry it replaced.
    pub fn insert(&mut self, reflection: Reflection) -> Option<Reflection> {
        self.reflections.insert(reflection.indices, reflection)
    }

    pub fn find(&self, h: i32, k: i32, l: i32) -> Option<&Reflection> {
        self.reflections.get(&MillerIndex::new(h, k, l))
    }

    pub fn find_mut(&mut self, h: i32, k: i32, l: i32) -> Option<&mut Reflection> {
        self.reflections.get_mut(&MillerIndex::new(h, k, l))
    }

    pub fn contains(&self, h: i32, k: i32, l: i32) -> bool {
        self.reflections.contains_key(&MillerIndex::new(h, k, l))
    }

    pub fn iter(&self) -> btree_map::Values<'_, MillerIndex, Reflection> {
        self.reflections.values()
    }

    pub fn iter_mut(&mut self) -> btree_map::ValuesMut<'_, MillerIndex, Reflection> {
        self.reflections.values_mut()
    }

    pub fn len(&self) -> usize {
        self.reflections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reflections.is_empty()
    }
}

impl FromIterator<Reflection> for ReflectionList {
    fn from_iter<I: IntoIterator<Item = Reflection>>(iter: I) -> Self {
        ReflectionList {
            reflections: iter.into_iter().map(|r| (r.indices, r)).collect(),
        }
    }
}

impl From<Vec<Reflection>> for ReflectionList {
    fn from(reflections: Vec<Reflection>) -> Self {
        reflections.into_iter().collect()
    }
}

impl From<ReflectionList> for Vec<Reflection> {
    fn from(list: ReflectionList) -> Self {
        list.reflections.into_values().collect()
    }
}

impl<'a> IntoIterator for &'a ReflectionList {
    type Item = &'a Reflection;
    type IntoIter = btree_map::Values<'a, MillerIndex, Reflection>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// ======================== RESOLUTION UTILITIES ========================

/// Smallest and largest 1/d (m^-1) over the list, or `None` for an empty list.
pub fn resolution_limits(list: &ReflectionList, cell: &UnitCell) -> Option<(f64, f64)> {
    list.iter()
        .map(|refl| {
            let hkl = refl.indices();
            2.0 * cell.resolution(hkl.h, hkl.k, hkl.l)
        })
        .fold(None, |acc, one_over_d| match acc {
            None => Some((one_over_d, one_over_d)),
            Some((lo, hi)) => Some((lo.min(one_over_d), hi.max(one_over_d))),
        })
}

/// Copy of `list` keeping reflections with min <= 1/d <= max (m^-1).
pub fn res_cutoff(list: &ReflectionList, cell: &UnitCell, min: f64, max: f64) -> ReflectionList {
    list.iter()
        .filter(|refl| {
            let hkl = refl.indices();
            let one_over_d = 2.0 * cell.resolution(hkl.h, hkl.k, hkl.l);
            one_over_d >= min && one_over_d <= max
        })
        .cloned()
        .collect()
}
