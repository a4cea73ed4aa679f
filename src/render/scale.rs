// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Evaluation of styling rules

use super::{Scale, StyleRange, StylingRule};

impl Scale {
    /// Map a normalised value in [0, 1] through the scale
    #[must_use]
    pub fn apply(self, normalized: f64) -> f64 {
        match self {
            Self::Linear => normalized,
            Self::Log => (normalized * 9.0 + 1.0).log10(),
            Self::Sqrt => normalized.sqrt(),
        }
    }
}

impl StylingRule {
    /// Position of `value` within the rule's domain, clamped to [0, 1]
    #[must_use]
    pub fn normalize(&self, value: f64, default_domain: [f64; 2]) -> f64 {
        let [lo, hi] = self.domain.unwrap_or(default_domain);
        let span = hi - lo;
        if span == 0.0 || !span.is_finite() {
            return 0.0;
        }
        ((value - lo) / span).clamp(0.0, 1.0)
    }

    /// Numeric output bounds, if the range is numeric
    #[must_use]
    pub fn numeric_range(&self) -> Option<[f64; 2]> {
        match &self.range {
            Some(StyleRange::Numeric(values)) if values.len() >= 2 => Some([values[0], values[1]]),
            _ => None,
        }
    }

    /// Colour palette, if the range is one
    #[must_use]
    pub fn palette(&self) -> Option<&[String]> {
        match &self.range {
            Some(StyleRange::Colors(colors)) if !colors.is_empty() => Some(colors),
            _ => None,
        }
    }

    /// Scale `value` onto the numeric range
    #[must_use]
    pub fn scale_number(&self, value: f64, default_domain: [f64; 2], default_range: [f64; 2]) -> f64 {
        let [lo, hi] = self.numeric_range().unwrap_or(default_range);
        let scaled = self.scale.apply(self.normalize(value, default_domain));
        lo + (hi - lo) * scaled
    }

    /// Pick a palette colour for a numeric `value`
    #[must_use]
    pub fn color_for(&self, value: f64, default_domain: [f64; 2]) -> Option<&str> {
        let palette = self.palette()?;
        let normalized = self.normalize(value, default_domain);
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
        let index = (normalized * (palette.len() - 1) as f64).floor() as usize;
        palette.get(index).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(scale: Scale, domain: Option<[f64; 2]>, range: Option<StyleRange>) -> StylingRule {
        StylingRule {
            property: "size".into(),
            field: "metrics.stars".into(),
            scale,
            domain,
            range,
        }
    }

    #[test]
    fn test_scales_fix_endpoints() {
        for scale in [Scale::Linear, Scale::Log, Scale::Sqrt] {
            assert!((scale.apply(0.0)).abs() < 1e-12);
            assert!((scale.apply(1.0) - 1.0).abs() < 1e-12);
        }
        assert!((Scale::Sqrt.apply(0.25) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_scale_number_clamps_and_maps() {
        let r = rule(Scale::Linear, Some([0.0, 100.0]), Some(StyleRange::Numeric(vec![5.0, 20.0])));
        assert!((r.scale_number(50.0, [0.0, 1.0], [0.0, 1.0]) - 12.5).abs() < 1e-9);
        assert!((r.scale_number(500.0, [0.0, 1.0], [0.0, 1.0]) - 20.0).abs() < 1e-9);
        assert!((r.scale_number(-3.0, [0.0, 1.0], [0.0, 1.0]) - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_defaults_apply_when_rule_is_silent() {
        let r = rule(Scale::Linear, None, None);
        assert!((r.scale_number(10.0, [1.0, 10.0], [1.0, 5.0]) - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_degenerate_domain_maps_to_start() {
        let r = rule(Scale::Linear, Some([3.0, 3.0]), Some(StyleRange::Numeric(vec![2.0, 4.0])));
        assert!((r.scale_number(3.0, [0.0, 1.0], [0.0, 1.0]) - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_color_for_numeric_value() {
        let r = rule(
            Scale::Linear,
            Some([0.0, 10.0]),
            Some(StyleRange::Colors(vec!["#000000".into(), "#888888".into(), "#ffffff".into()])),
        );
        assert_eq!(r.color_for(0.0, [0.0, 100.0]), Some("#000000"));
        assert_eq!(r.color_for(6.0, [0.0, 100.0]), Some("#888888"));
        assert_eq!(r.color_for(10.0, [0.0, 100.0]), Some("#ffffff"));
    }
}
