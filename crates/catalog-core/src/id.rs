//! Product identifiers and the allocation policy that assigns them.
//!
//! Ids are assigned by the store, never supplied by clients. Two policies
//! exist because deleting the current maximum and creating again behaves
//! differently under each:
//!
//! - [`IdAllocation::MaxPlusOne`] derives the next id from the live
//!   collection only, so a deleted maximum is handed out again.
//! - [`IdAllocation::Monotonic`] keeps a high-water mark for the lifetime
//!   of the allocator, so no id is reused while the process runs.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::product::Product;

/// Unique identifier of a product within the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ProductId(pub u64);

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ProductId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<u64>().map(ProductId)
    }
}

/// How new ids are derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IdAllocation {
    /// `max(existing) + 1`, or `1` for an empty collection.
    #[default]
    MaxPlusOne,
    /// Never hand out an id at or below the highest id ever observed.
    Monotonic,
}

impl FromStr for IdAllocation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "max-plus-one" | "max_plus_one" => Ok(IdAllocation::MaxPlusOne),
            "monotonic" => Ok(IdAllocation::Monotonic),
            other => Err(format!(
                "unknown id policy '{other}' (expected 'max-plus-one' or 'monotonic')"
            )),
        }
    }
}

impl fmt::Display for IdAllocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdAllocation::MaxPlusOne => write!(f, "max-plus-one"),
            IdAllocation::Monotonic => write!(f, "monotonic"),
        }
    }
}

/// Assigns ids according to an [`IdAllocation`] policy.
///
/// Allocation is split into [`next`](IdAllocator::next), which computes the
/// candidate without side effects, and [`advance`](IdAllocator::advance),
/// which records it once the new record is durably committed. A create that
/// fails to persist therefore leaves the allocator untouched.
#[derive(Debug, Clone)]
pub struct IdAllocator {
    policy: IdAllocation,
    high_water: u64,
}

impl IdAllocator {
    pub fn new(policy: IdAllocation) -> Self {
        IdAllocator {
            policy,
            high_water: 0,
        }
    }

    pub fn policy(&self) -> IdAllocation {
        self.policy
    }

    /// Raises the high-water mark to the largest id in `products`.
    pub fn observe(&mut self, products: &[Product]) {
        self.high_water = self.high_water.max(max_id(products));
    }

    /// Computes the id the next created product would receive.
    pub fn next(&self, products: &[Product]) -> Result<ProductId, CoreError> {
        let floor = match self.policy {
            IdAllocation::MaxPlusOne => max_id(products),
            IdAllocation::Monotonic => self.high_water.max(max_id(products)),
        };
        floor
            .checked_add(1)
            .map(ProductId)
            .ok_or(CoreError::IdSpaceExhausted {
                last: ProductId(floor),
            })
    }

    /// Records that `id` has been committed.
    pub fn advance(&mut self, id: ProductId) {
        self.high_water = self.high_water.max(id.0);
    }
}

fn max_id(products: &[Product]) -> u64 {
    products.iter().map(|p| p.id.0).max().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::product::ProductDraft;
    use proptest::prelude::*;

    fn product(id: u64) -> Product {
        let draft = ProductDraft::new(Some("item".into()), Some(1.0), None, None).unwrap();
        Product::from_draft(ProductId(id), draft)
    }

    #[test]
    fn empty_collection_starts_at_one() {
        for policy in [IdAllocation::MaxPlusOne, IdAllocation::Monotonic] {
            let alloc = IdAllocator::new(policy);
            assert_eq!(alloc.next(&[]).unwrap(), ProductId(1));
        }
    }

    #[test]
    fn max_plus_one_ignores_insertion_order() {
        let alloc = IdAllocator::new(IdAllocation::MaxPlusOne);
        let products = vec![product(4), product(9), product(2)];
        assert_eq!(alloc.next(&products).unwrap(), ProductId(10));
    }

    #[test]
    fn max_plus_one_reuses_deleted_maximum() {
        let mut alloc = IdAllocator::new(IdAllocation::MaxPlusOne);
        let mut products = vec![product(1), product(2)];
        alloc.observe(&products);
        products.pop();
        assert_eq!(alloc.next(&products).unwrap(), ProductId(2));
    }

    #[test]
    fn monotonic_never_reuses_deleted_maximum() {
        let mut alloc = IdAllocator::new(IdAllocation::Monotonic);
        let mut products = vec![product(1), product(2)];
        alloc.observe(&products);
        products.pop();
        assert_eq!(alloc.next(&products).unwrap(), ProductId(3));
    }

    #[test]
    fn next_has_no_side_effect_until_advance() {
        let mut alloc = IdAllocator::new(IdAllocation::Monotonic);
        let first = alloc.next(&[]).unwrap();
        assert_eq!(alloc.next(&[]).unwrap(), first);
        alloc.advance(first);
        assert_eq!(alloc.next(&[]).unwrap(), ProductId(2));
    }

    #[test]
    fn exhausted_id_space_is_an_error() {
        let alloc = IdAllocator::new(IdAllocation::MaxPlusOne);
        let err = alloc.next(&[product(u64::MAX)]).unwrap_err();
        assert!(matches!(err, CoreError::IdSpaceExhausted { .. }));
    }

    #[test]
    fn policy_parses_from_config_strings() {
        assert_eq!("monotonic".parse::<IdAllocation>().unwrap(), IdAllocation::Monotonic);
        assert_eq!(
            "Max-Plus-One".parse::<IdAllocation>().unwrap(),
            IdAllocation::MaxPlusOne
        );
        assert!("random".parse::<IdAllocation>().is_err());
    }

    #[test]
    fn product_id_parses_path_segments() {
        assert_eq!("17".parse::<ProductId>().unwrap(), ProductId(17));
        assert!("abc".parse::<ProductId>().is_err());
        assert!("-1".parse::<ProductId>().is_err());
    }

    #[derive(Debug, Clone)]
    enum Op {
        Create,
        DeleteAt(usize),
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            3 => Just(Op::Create),
            1 => (0usize..16).prop_map(Op::DeleteAt),
        ]
    }

    /// Replays create/delete sequences, returning every id handed out.
    fn replay(policy: IdAllocation, ops: &[Op]) -> (Vec<Product>, Vec<ProductId>) {
        let mut alloc = IdAllocator::new(policy);
        let mut products = Vec::new();
        let mut issued = Vec::new();
        for op in ops {
            match op {
                Op::Create => {
                    let id = alloc.next(&products).unwrap();
                    products.push(product(id.0));
                    alloc.advance(id);
                    issued.push(id);
                }
                Op::DeleteAt(idx) => {
                    if !products.is_empty() {
                        products.remove(idx % products.len());
                    }
                }
            }
        }
        (products, issued)
    }

    proptest! {
        #[test]
        fn live_ids_are_always_unique(ops in proptest::collection::vec(op_strategy(), 0..64)) {
            for policy in [IdAllocation::MaxPlusOne, IdAllocation::Monotonic] {
                let (products, _) = replay(policy, &ops);
                let mut ids: Vec<u64> = products.iter().map(|p| p.id.0).collect();
                let len = ids.len();
                ids.sort_unstable();
                ids.dedup();
                prop_assert_eq!(ids.len(), len);
            }
        }

        #[test]
        fn creates_alone_count_up_from_one(n in 0usize..64) {
            let ops = vec![Op::Create; n];
            for policy in [IdAllocation::MaxPlusOne, IdAllocation::Monotonic] {
                let (_, issued) = replay(policy, &ops);
                let expected: Vec<ProductId> = (1..=n as u64).map(ProductId).collect();
                prop_assert_eq!(&issued, &expected);
            }
        }

        #[test]
        fn monotonic_issues_strictly_increasing_ids(ops in proptest::collection::vec(op_strategy(), 0..64)) {
            let (_, issued) = replay(IdAllocation::Monotonic, &ops);
            prop_assert!(issued.windows(2).all(|w| w[0] < w[1]));
        }
    }
}
