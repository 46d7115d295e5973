//! One-dimensional data to device mapping.
//!
//! An [`AxisMap`] is built once per render pass from an axis's bound
//! descriptor and a device interval `[origin, origin + length]`. It never
//! fails loudly: degenerate bounds give an invalid map, and values that cannot
//! be represented map to `None` (or to the `±f64::MAX` sentinel through
//! [`AxisMap::to_view_raw`]). Callers check before drawing.

use super::{AxisBounds, ScaleKind};

/// Data to device transform bound to one axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisMap {
    bounds: AxisBounds,
    origin: f64,
    length: f64,
    /// Scaled bounds and span (natural log for log axes).
    t_min: f64,
    t_max: f64,
    t_span: f64,
    valid: bool,
}

impl AxisMap {
    /// Build a map from `bounds` onto `[origin, origin + length]`.
    ///
    /// The map is invalid when the span is zero, negative or non-finite, or
    /// when a log axis has a non-positive minimum.
    #[must_use]
    pub fn new(bounds: &AxisBounds, origin: f64, length: f64) -> Self {
        let (min, max) = (bounds.minimum, bounds.maximum);
        let mut valid = min.is_finite()
            && max.is_finite()
            && max > min
            && origin.is_finite()
            && length.is_finite();

        let (t_min, t_max) = match bounds.scale {
            ScaleKind::Linear => (min, max),
            ScaleKind::Log => {
                valid &= min > 0.0;
                (min.ln(), max.ln())
            }
        };
        let t_span = t_max - t_min;
        valid &= t_span.is_finite() && t_span > 0.0;

        Self {
            bounds: *bounds,
            origin,
            length,
            t_min,
            t_max,
            t_span,
            valid,
        }
    }

    /// Whether the map can convert anything.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Whether increasing data values run towards the origin.
    #[must_use]
    pub fn is_inverted(&self) -> bool {
        self.bounds.is_inverted
    }

    /// Category axis.
    #[must_use]
    pub fn is_discrete(&self) -> bool {
        self.bounds.is_discrete
    }

    /// Scale kind of the source axis.
    #[must_use]
    pub fn scale(&self) -> ScaleKind {
        self.bounds.scale
    }

    fn scaled(&self, x: f64) -> f64 {
        match self.bounds.scale {
            ScaleKind::Linear => x,
            ScaleKind::Log if x > 0.0 => x.ln(),
            ScaleKind::Log => f64::NEG_INFINITY,
        }
    }

    /// Map `x` to device space, keeping the sentinel contract.
    ///
    /// NaN input (or an invalid map) gives NaN. Values whose image overflows,
    /// including infinities and non-positive values on a log axis, give
    /// `±f64::MAX` with the sign of the direction they run off in.
    #[must_use]
    pub fn to_view_raw(&self, x: f64) -> f64 {
        if !self.valid || x.is_nan() {
            return f64::NAN;
        }
        let t = self.scaled(x);
        let frac = if self.bounds.is_inverted {
            (self.t_max - t) / self.t_span
        } else {
            (t - self.t_min) / self.t_span
        };
        let v = self.origin + self.length * frac;
        if v.is_nan() {
            f64::NAN
        } else if v.is_infinite() {
            f64::MAX.copysign(v)
        } else {
            v
        }
    }

    /// Map `x` to device space; `None` when the image is not a usable number.
    ///
    /// Values outside the bounds still map (off the plot area); use
    /// [`AxisMap::is_finite`] to decide whether they should be drawn at all.
    #[must_use]
    pub fn to_view(&self, x: f64) -> Option<f64> {
        let v = self.to_view_raw(x);
        (v.is_finite() && v.abs() != f64::MAX).then_some(v)
    }

    /// Inverse mapping from device space to data space.
    #[must_use]
    pub fn from_view(&self, u: f64) -> f64 {
        if !self.valid || self.length == 0.0 {
            return f64::NAN;
        }
        let frac = (u - self.origin) / self.length;
        let t = if self.bounds.is_inverted {
            self.t_max - self.t_span * frac
        } else {
            self.t_min + self.t_span * frac
        };
        match self.bounds.scale {
            ScaleKind::Linear => t,
            ScaleKind::Log => t.exp(),
        }
    }

    /// Whether `x` is finite, representable and inside the bounds.
    #[must_use]
    pub fn is_finite(&self, x: f64) -> bool {
        if !self.valid || !x.is_finite() {
            return false;
        }
        if self.bounds.scale == ScaleKind::Log && x <= 0.0 {
            return false;
        }
        let slack = (self.bounds.maximum - self.bounds.minimum).abs() * 1e-10;
        x >= self.bounds.minimum - slack && x <= self.bounds.maximum + slack
    }

    /// Whether `x` maps to a usable device value, inside the bounds or not.
    #[must_use]
    pub fn is_mappable(&self, x: f64) -> bool {
        self.to_view(x).is_some()
    }

    /// `(minimum, maximum)` of the source bounds.
    #[must_use]
    pub fn get_bounds(&self) -> (f64, f64) {
        (self.bounds.minimum, self.bounds.maximum)
    }

    /// Device position of the data value 0, clamped into the bounds.
    ///
    /// Log axes have no zero and use their minimum.
    #[must_use]
    pub fn get_baseline(&self) -> f64 {
        let (min, max) = self.get_bounds();
        let base = match self.bounds.scale {
            ScaleKind::Log => min,
            ScaleKind::Linear => 0f64.clamp(min.min(max), max.max(min)),
        };
        self.to_view_raw(base)
    }

    /// Device positions of the minimum and maximum, in that order.
    #[must_use]
    pub fn get_extents(&self) -> (f64, f64) {
        let (min, max) = self.get_bounds();
        (self.to_view_raw(min), self.to_view_raw(max))
    }

    /// Device interval `(origin, length)` this map was built on.
    #[must_use]
    pub fn device_interval(&self) -> (f64, f64) {
        (self.origin, self.length)
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(500))]

        /// Mapping is monotonic inside the bounds, direction set by inversion.
        #[test]
        fn prop_monotonic(
            min in -1e6f64..1e6,
            span in 1e-3f64..1e6,
            origin in -1e4f64..1e4,
            length in 1.0f64..1e4,
            inverted in any::<bool>(),
            a in 0.0f64..1.0,
            b in 0.0f64..1.0,
        ) {
            let mut bounds = AxisBounds::linear(min, min + span);
            bounds.is_inverted = inverted;
            let map = AxisMap::new(&bounds, origin, length);
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            let x0 = min + span * lo;
            let x1 = min + span * hi;
            let (u0, u1) = (map.to_view(x0).unwrap(), map.to_view(x1).unwrap());
            if inverted {
                prop_assert!(u0 >= u1);
            } else {
                prop_assert!(u0 <= u1);
            }
        }

        /// The bounds map exactly onto the device endpoints.
        #[test]
        fn prop_endpoints_exact(
            min in -1e6f64..1e6,
            span in 1e-3f64..1e6,
            origin in -1e4f64..1e4,
            length in -1e4f64..1e4,
            inverted in any::<bool>(),
        ) {
            let mut bounds = AxisBounds::linear(min, min + span);
            bounds.is_inverted = inverted;
            let map = AxisMap::new(&bounds, origin, length);
            let (u_min, u_max) = map.get_extents();
            if inverted {
                prop_assert_eq!(u_min, origin + length);
                prop_assert_eq!(u_max, origin);
            } else {
                prop_assert_eq!(u_min, origin);
                prop_assert_eq!(u_max, origin + length);
            }
        }

        /// Interpolating the endpoints agrees with mapping the interpolated value.
        #[test]
        fn prop_linear_interpolation(
            min in -1e3f64..1e3,
            span in 1e-2f64..1e3,
            length in 1.0f64..1e3,
            t in 0.0f64..1.0,
        ) {
            let max = min + span;
            let map = AxisMap::new(&AxisBounds::linear(min, max), 0.0, length);
            let (u0, u1) = map.get_extents();
            let expected = u0 + (u1 - u0) * t;
            let actual = map.to_view((1.0 - t) * min + t * max).unwrap();
            prop_assert!((expected - actual).abs() <= 1e-6 * length.max(1.0));
        }

        /// Log maps stay monotonic over positive values.
        #[test]
        fn prop_log_monotonic(
            exp_min in -6.0f64..3.0,
            decades in 0.5f64..6.0,
            a in 0.0f64..1.0,
            b in 0.0f64..1.0,
        ) {
            let min = 10f64.powf(exp_min);
            let max = 10f64.powf(exp_min + decades);
            let map = AxisMap::new(&AxisBounds::log(min, max), 0.0, 500.0);
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            let x0 = min * (max / min).powf(lo);
            let x1 = min * (max / min).powf(hi);
            prop_assert!(map.to_view(x0).unwrap() <= map.to_view(x1).unwrap());
        }
    }
}
