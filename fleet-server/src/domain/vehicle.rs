//! Vehicle types.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::Position;
use super::route::RouteVariant;

/// Opaque vehicle document id (e.g. `"bus_no_7"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VehicleId(String);

impl VehicleId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VehicleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Human-facing vehicle label, ordered naturally.
///
/// Labels are mostly numeric ("2", "14") but occasionally carry a
/// suffix ("14A"). Natural ordering compares digit runs by value, so
/// "2" sorts before "10"; plain lexicographic order would not.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VehicleNumber(String);

impl VehicleNumber {
    pub fn new(number: impl Into<String>) -> Self {
        Self(number.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VehicleNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Ord for VehicleNumber {
    fn cmp(&self, other: &Self) -> Ordering {
        // Raw-string tie-break keeps Ord consistent with the derived
        // PartialEq when labels differ only in leading zeros.
        natural_cmp(&self.0, &other.0).then_with(|| self.0.cmp(&other.0))
    }
}

impl PartialOrd for VehicleNumber {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Compare strings treating maximal digit runs as numbers.
fn natural_cmp(a: &str, b: &str) -> Ordering {
    let a = a.as_bytes();
    let b = b.as_bytes();
    let (mut i, mut j) = (0, 0);

    while i < a.len() && j < b.len() {
        if a[i].is_ascii_digit() && b[j].is_ascii_digit() {
            let ra = digit_run(a, i);
            let rb = digit_run(b, j);
            let da = trim_zeros(&a[i..ra]);
            let db = trim_zeros(&b[j..rb]);
            // Longer run of significant digits is the larger number.
            let ord = da.len().cmp(&db.len()).then_with(|| da.cmp(db));
            if ord != Ordering::Equal {
                return ord;
            }
            i = ra;
            j = rb;
        } else {
            let ord = a[i].cmp(&b[j]);
            if ord != Ordering::Equal {
                return ord;
            }
            i += 1;
            j += 1;
        }
    }

    (a.len() - i).cmp(&(b.len() - j))
}

fn digit_run(s: &[u8], start: usize) -> usize {
    let mut end = start;
    while end < s.len() && s[end].is_ascii_digit() {
        end += 1;
    }
    end
}

fn trim_zeros(digits: &[u8]) -> &[u8] {
    let first = digits.iter().position(|&d| d != b'0');
    match first {
        Some(idx) => &digits[idx..],
        None => &digits[digits.len() - 1..], // all zeros, keep one
    }
}

/// Whether a vehicle is in service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VehicleStatus {
    Active,
    Inactive,
}

/// A tracked vehicle.
///
/// Every field except `last_known_location` is owned by the admin-edit
/// workflow on the document store; `last_known_location` is the static
/// fix recorded there, used only when the live hub has never heard
/// from the vehicle. The live position cache itself is owned by
/// [`crate::hub::LiveLocationHub`] and is not part of this type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: VehicleId,
    pub number: VehicleNumber,
    pub route_id: Option<String>,
    pub variant: RouteVariant,
    pub status: VehicleStatus,
    pub last_known_location: Option<Position>,
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Natural ordering agrees with numeric ordering on pure numbers.
        #[test]
        fn agrees_with_numeric(a in 0u32..10_000, b in 0u32..10_000) {
            let na = VehicleNumber::new(a.to_string());
            let nb = VehicleNumber::new(b.to_string());
            prop_assert_eq!(na.cmp(&nb), a.cmp(&b));
        }

        /// Ordering is total: comparison never panics and is antisymmetric.
        #[test]
        fn antisymmetric(a in "[0-9A-Za-z]{0,6}", b in "[0-9A-Za-z]{0,6}") {
            let na = VehicleNumber::new(a);
            let nb = VehicleNumber::new(b);
            prop_assert_eq!(na.cmp(&nb), nb.cmp(&na).reverse());
        }
    }
}
