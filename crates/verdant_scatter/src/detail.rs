//! # Detail-Tier Selector
//!
//! Each placed object carries a few variants of its content, finest first.
//! A variant becomes active once the viewer is at least its activation
//! distance away:
//!
//! ```text
//!   distance:  0 ─────────── 10 ─────────────── 30 ──────────▶
//!   variant:   │    X (full)   │   Y (reduced)    │  Z (proxy)
//! ```
//!
//! `select` is pure and has no memory, so a viewer sitting exactly on a
//! threshold may flip between tiers from frame to frame. `TierTracker`
//! layers a hysteresis band on top for callers that need stable output.

use crate::error::{ScatterError, ScatterResult};

/// Content paired with the distance at which it takes over.
#[derive(Clone, Debug, PartialEq)]
pub struct DetailVariant<C> {
    /// Renderable content.
    pub content: C,
    /// Minimum viewer distance, `>= 0`.
    pub activation_distance: f32,
}

impl<C> DetailVariant<C> {
    /// Pairs `content` with `activation_distance`.
    #[inline]
    #[must_use]
    pub const fn new(content: C, activation_distance: f32) -> Self {
        Self {
            content,
            activation_distance,
        }
    }
}

/// Validated variants, strictly ascending by distance, first at 0.
#[derive(Clone, Debug, PartialEq)]
pub struct DetailTierSet<C> {
    variants: Vec<DetailVariant<C>>,
}

impl<C> DetailTierSet<C> {
    /// Validates and wraps `variants`.
    ///
    /// # Errors
    ///
    /// - `EmptyTierSet` if there are no variants
    /// - `InvalidDistance` for a negative or non-finite distance
    /// - `NonAscending` if distances do not strictly increase
    /// - `MissingFallback` if the first distance is not 0
    pub fn build(variants: Vec<DetailVariant<C>>) -> ScatterResult<Self> {
        let Some(first) = variants.first() else {
            return Err(ScatterError::EmptyTierSet);
        };

        for (index, variant) in variants.iter().enumerate() {
            let distance = variant.activation_distance;
            if !(distance.is_finite() && distance >= 0.0) {
                return Err(ScatterError::InvalidDistance { index, distance });
            }
        }

        for (index, pair) in variants.windows(2).enumerate() {
            let (previous, current) = (pair[0].activation_distance, pair[1].activation_distance);
            if current <= previous {
                return Err(ScatterError::NonAscending {
                    index: index + 1,
                    previous,
                    current,
                });
            }
        }

        if first.activation_distance > 0.0 {
            return Err(ScatterError::MissingFallback(first.activation_distance));
        }

        Ok(Self { variants })
    }

    /// Index of the variant active at `distance`.
    ///
    /// Negative and NaN distances select the fallback.
    #[inline]
    #[must_use]
    pub fn select_index(&self, distance: f32) -> usize {
        self.variants
            .partition_point(|v| v.activation_distance <= distance)
            .saturating_sub(1)
    }

    /// Variant active at `distance`: the largest activation distance `<= distance`.
    #[inline]
    #[must_use]
    pub fn select(&self, distance: f32) -> &DetailVariant<C> {
        &self.variants[self.select_index(distance)]
    }

    /// Number of tiers.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.variants.len()
    }

    /// Always false for a built set.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }

    /// Variants, finest first.
    #[inline]
    #[must_use]
    pub fn variants(&self) -> &[DetailVariant<C>] {
        &self.variants
    }

    /// Mutable access to each variant's content. Thresholds stay fixed.
    pub fn contents_mut(&mut self) -> impl Iterator<Item = &mut C> + '_ {
        self.variants.iter_mut().map(|v| &mut v.content)
    }

    /// Activation distances, ascending.
    pub fn thresholds(&self) -> impl Iterator<Item = f32> + '_ {
        self.variants.iter().map(|v| v.activation_distance)
    }

    /// Maps every variant's content, keeping the thresholds.
    pub fn map<D>(self, mut f: impl FnMut(C) -> D) -> DetailTierSet<D> {
        DetailTierSet {
            variants: self
                .variants
                .into_iter()
                .map(|v| DetailVariant::new(f(v.content), v.activation_distance))
                .collect(),
        }
    }

    /// Unwraps the variants.
    #[must_use]
    pub fn into_variants(self) -> Vec<DetailVariant<C>> {
        self.variants
    }
}

/// Sticky tier choice for one object.
///
/// Moving outward, tier `t` is entered once `distance >= threshold[t] + band`;
/// moving inward, it is left once `distance < threshold[t] - band`. With a
/// zero band every update equals [`DetailTierSet::select_index`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TierTracker {
    band: f32,
    current: Option<usize>,
}

impl TierTracker {
    /// Creates a tracker with hysteresis `band`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidBand` if `band` is negative or non-finite.
    pub fn new(band: f32) -> ScatterResult<Self> {
        if !(band.is_finite() && band >= 0.0) {
            return Err(ScatterError::InvalidBand(band));
        }
        Ok(Self {
            band,
            current: None,
        })
    }

    /// Hysteresis band.
    #[inline]
    #[must_use]
    pub const fn band(&self) -> f32 {
        self.band
    }

    /// Last tier returned, if any.
    #[inline]
    #[must_use]
    pub const fn current(&self) -> Option<usize> {
        self.current
    }

    /// Forgets the current tier.
    pub fn reset(&mut self) {
        self.current = None;
    }

    /// Updates for a new viewer distance and returns the active tier index.
    pub fn update<C>(&mut self, set: &DetailTierSet<C>, distance: f32) -> usize {
        let thresholds = &set.variants;
        let mut tier = match self.current {
            Some(tier) => tier.min(thresholds.len() - 1),
            None => {
                let tier = set.select_index(distance);
                self.current = Some(tier);
                return tier;
            }
        };

        while tier + 1 < thresholds.len()
            && distance >= thresholds[tier + 1].activation_distance + self.band
        {
            tier += 1;
        }
        while tier > 0 && distance < thresholds[tier].activation_distance - self.band {
            tier -= 1;
        }

        self.current = Some(tier);
        tier
    }

    /// Like [`update`](Self::update), returning the variant.
    pub fn select<'a, C>(&mut self, set: &'a DetailTierSet<C>, distance: f32) -> &'a DetailVariant<C> {
        let tier = self.update(set, distance);
        &set.variants[tier]
    }
}
