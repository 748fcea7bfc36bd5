//! Overflow splitter: exact division of a unit's content across N locations.
//!
//! Shares are computed in smallest units with integer truncation; the last
//! share absorbs the remainder, so the sum over all shares equals the
//! requested total exactly. No floating point, no rounding drift.

use serde::{Deserialize, Serialize};

use slotwise_core::{Dimensions, Quantity, Volume, Weight};

/// The portion of a handling unit destined for one location.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Share {
    pub quantity: Quantity,
    pub volume: Volume,
    pub weight: Weight,
    /// Scaled by `1/split_total`; audit display only, not real geometry.
    pub dimensions: Dimensions,
    /// 1-based ("2 of 3").
    pub split_index: u32,
    pub split_total: u32,
}

/// Divide the requested totals across `n ≥ 1` locations.
///
/// `n == 1` hands the entire total to the single location without any
/// arithmetic. For `n > 1`, each of the first `n-1` shares is the truncated
/// even split; the final share is `total − sum(previous)`.
pub fn split(
    quantity: Quantity,
    volume: Volume,
    weight: Weight,
    dimensions: Dimensions,
    n: usize,
) -> Vec<Share> {
    debug_assert!(n >= 1, "split called with zero locations");

    if n == 1 {
        return vec![Share {
            quantity,
            volume,
            weight,
            dimensions,
            split_index: 1,
            split_total: 1,
        }];
    }

    let total = n as u32;
    let even_qty = quantity.div_even(n as i64);
    let even_vol = volume.div_even(n as i64);
    let even_wgt = weight.div_even(n as i64);
    // Every share shows the same 1/N-scaled dimensions, remainder included.
    let scaled_dims = dimensions.div_even(n as i64);

    let mut shares = Vec::with_capacity(n);
    for i in 0..n - 1 {
        shares.push(Share {
            quantity: even_qty,
            volume: even_vol,
            weight: even_wgt,
            dimensions: scaled_dims,
            split_index: (i + 1) as u32,
            split_total: total,
        });
    }

    let allotted_qty: Quantity = shares.iter().map(|s| s.quantity).sum();
    let allotted_vol: Volume = shares.iter().map(|s| s.volume).sum();
    let allotted_wgt: Weight = shares.iter().map(|s| s.weight).sum();
    shares.push(Share {
        quantity: quantity - allotted_qty,
        volume: volume - allotted_vol,
        weight: weight - allotted_wgt,
        dimensions: scaled_dims,
        split_index: total,
        split_total: total,
    });

    shares
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn dims(l: i64, w: i64, h: i64) -> Dimensions {
        Dimensions::new(l, w, h)
    }

    #[test]
    fn single_location_gets_everything_untouched() {
        let shares = split(
            Quantity::new(7),
            Volume::new(13),
            Weight::new(999),
            dims(120, 80, 100),
            1,
        );
        assert_eq!(shares.len(), 1);
        assert_eq!(shares[0].quantity, Quantity::new(7));
        assert_eq!(shares[0].dimensions, dims(120, 80, 100));
        assert_eq!((shares[0].split_index, shares[0].split_total), (1, 1));
    }

    #[test]
    fn three_way_split_matches_floor_plus_remainder() {
        // 100 / 30 / 500 across three bins.
        let shares = split(
            Quantity::new(100),
            Volume::new(30),
            Weight::new(500),
            dims(120, 80, 100),
            3,
        );
        assert_eq!(shares.len(), 3);

        for share in &shares[..2] {
            assert_eq!(share.quantity, Quantity::new(33));
            assert_eq!(share.volume, Volume::new(10));
            assert_eq!(share.weight, Weight::new(166));
        }
        let last = &shares[2];
        assert_eq!(last.quantity, Quantity::new(34));
        assert_eq!(last.volume, Volume::new(10));
        assert_eq!(last.weight, Weight::new(168));

        assert_eq!(
            shares
                .iter()
                .map(|s| (s.split_index, s.split_total))
                .collect::<Vec<_>>(),
            vec![(1, 3), (2, 3), (3, 3)]
        );
    }

    #[test]
    fn dimensions_scale_evenly_on_every_share() {
        let shares = split(
            Quantity::new(9),
            Volume::new(9),
            Weight::new(9),
            dims(121, 80, 100),
            3,
        );
        for share in &shares {
            assert_eq!(share.dimensions, dims(40, 26, 33));
        }
    }

    #[test]
    fn negative_totals_split_exactly_too() {
        let shares = split(
            Quantity::new(-100),
            Volume::new(-30),
            Weight::new(-500),
            dims(0, 0, 0),
            3,
        );
        let qty: Quantity = shares.iter().map(|s| s.quantity).sum();
        assert_eq!(qty, Quantity::new(-100));
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 512,
            ..ProptestConfig::default()
        })]

        /// Property: for any totals and any N in [1,10], the shares sum to
        /// the totals exactly, in every dimension independently.
        #[test]
        fn shares_always_sum_to_totals(
            qty in -1_000_000i64..1_000_000i64,
            vol in -1_000_000i64..1_000_000i64,
            wgt in -1_000_000i64..1_000_000i64,
            n in 1usize..=10,
        ) {
            let shares = split(
                Quantity::new(qty),
                Volume::new(vol),
                Weight::new(wgt),
                dims(120, 80, 100),
                n,
            );
            prop_assert_eq!(shares.len(), n);

            let sum_qty: Quantity = shares.iter().map(|s| s.quantity).sum();
            let sum_vol: Volume = shares.iter().map(|s| s.volume).sum();
            let sum_wgt: Weight = shares.iter().map(|s| s.weight).sum();
            prop_assert_eq!(sum_qty, Quantity::new(qty));
            prop_assert_eq!(sum_vol, Volume::new(vol));
            prop_assert_eq!(sum_wgt, Weight::new(wgt));
        }

        /// Property: shares other than the last never differ, and the last
        /// differs from the rest by less than N smallest units.
        #[test]
        fn remainder_stays_below_n(
            qty in 0i64..1_000_000i64,
            n in 2usize..=10,
        ) {
            let shares = split(
                Quantity::new(qty),
                Volume::ZERO,
                Weight::ZERO,
                dims(0, 0, 0),
                n,
            );
            let even = shares[0].quantity;
            for share in &shares[..n - 1] {
                prop_assert_eq!(share.quantity, even);
            }
            let diff = shares[n - 1].quantity.units() - even.units();
            prop_assert!(diff >= 0 && diff < n as i64);
        }
    }
}
