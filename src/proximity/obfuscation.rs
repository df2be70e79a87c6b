//! Distance-based degradation: character masking and font sizing.

use rand::Rng;

use crate::common::text::{is_punctuation, markup_len};

/// Masking curve for one chat mode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DistanceObfuscation {
    /// Distance at which masking begins.
    pub onset: f64,
    /// Distance at which every eligible character is masked.
    pub max_range: f64,
    pub mask: char,
}

impl DistanceObfuscation {
    pub fn new(onset: f64, max_range: f64, mask: char) -> Self {
        Self {
            onset,
            max_range,
            mask,
        }
    }

    /// Probability that an eligible character is masked at `distance`.
    ///
    /// Zero below the onset (strictly less than), growing linearly to one at
    /// `max_range` and beyond.
    pub fn probability(&self, distance: f64) -> f64 {
        if distance < self.onset {
            0.0
        } else if self.max_range <= self.onset {
            1.0
        } else {
            (distance - self.onset) / (self.max_range - self.onset)
        }
    }

    /// Mask `text` as heard from `distance` away.
    pub fn apply<R: Rng + ?Sized>(&self, text: &str, distance: f64, rng: &mut R) -> String {
        mask_text(text, self.probability(distance), self.mask, rng)
    }
}

/// Replace each eligible character with `mask` with probability `p`.
///
/// Whitespace, punctuation, markup tags and entities are never masked.
pub fn mask_text<R: Rng + ?Sized>(text: &str, p: f64, mask: char, rng: &mut R) -> String {
    if p <= 0.0 {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(c) = rest.chars().next() {
        if let Some(len) = markup_len(rest) {
            out.push_str(&rest[..len]);
            rest = &rest[len..];
            continue;
        }

        let eligible = !c.is_whitespace() && !is_punctuation(c);
        if eligible && (p >= 1.0 || rng.gen_bool(p)) {
            out.push(mask);
        } else {
            out.push(c);
        }
        rest = &rest[c.len_utf8()..];
    }
    out
}

/// Font size for a message heard from `distance` away.
///
/// Interpolates linearly from `default_size` at distance zero down to the smallest
/// clamp size at `max_range`, then snaps to the nearest clamp size. Returns `None`
/// when no clamp sizes are configured.
pub fn font_size(distance: f64, max_range: f64, default_size: u32, clamp_sizes: &[u32]) -> Option<u32> {
    let min_size = f64::from(*clamp_sizes.iter().min()?);
    let closeness = if max_range > 0.0 {
        (1.0 - distance / max_range).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let raw = min_size + (f64::from(default_size) - min_size) * closeness;
    snap_to_clamp(raw, clamp_sizes)
}

/// Nearest clamp size by absolute difference. Equidistant candidates resolve to
/// the larger size.
pub fn snap_to_clamp(value: f64, clamp_sizes: &[u32]) -> Option<u32> {
    let mut sorted = clamp_sizes.to_vec();
    sorted.sort_unstable();

    let mut best: Option<(u32, f64)> = None;
    for size in sorted {
        let diff = (f64::from(size) - value).abs();
        match best {
            Some((_, best_diff)) if diff > best_diff => {}
            _ => best = Some((size, diff)),
        }
    }
    best.map(|(size, _)| size)
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    #[test]
    fn test_probability_curve() {
        let curve = DistanceObfuscation::new(15.0, 35.0, '*');
        assert_eq!(curve.probability(0.0), 0.0);
        assert_eq!(curve.probability(14.9), 0.0);
        assert_eq!(curve.probability(15.0), 0.0);
        assert!((curve.probability(25.0) - 0.5).abs() < 1e-9);
        assert!((curve.probability(35.0) - 1.0).abs() < 1e-9);
        assert!(curve.probability(50.0) >= 1.0);
    }

    #[test]
    fn test_degenerate_curve_masks_everything_past_onset() {
        let curve = DistanceObfuscation::new(10.0, 10.0, '*');
        assert_eq!(curve.probability(9.0), 0.0);
        assert_eq!(curve.probability(10.0), 1.0);
    }

    #[test]
    fn test_onset_distance_leaves_text_unchanged() {
        let curve = DistanceObfuscation::new(15.0, 35.0, '*');
        let text = "Hello there, friend.";
        assert_eq!(curve.apply(text, 15.0, &mut rng()), text);
        assert_eq!(curve.apply(text, 3.0, &mut rng()), text);
    }

    #[test]
    fn test_max_range_masks_every_eligible_char() {
        let curve = DistanceObfuscation::new(15.0, 35.0, '#');
        let out = curve.apply("Hi, you!", 35.0, &mut rng());
        assert_eq!(out, "##, ###!");
    }

    #[test]
    fn test_far_distance_statistics() {
        let curve = DistanceObfuscation::new(15.0, 35.0, '*');
        let text: String = "abcdefghij".repeat(100);
        let out = curve.apply(&text, 50.0, &mut rand::thread_rng());
        let masked = out.chars().filter(|&c| c == '*').count();
        assert!(masked >= 950, "only {} of 1000 masked", masked);
    }

    #[test]
    fn test_partial_masking_is_partial() {
        let text: String = "abcdefghij".repeat(100);
        let out = mask_text(&text, 0.5, '*', &mut rng());
        let masked = out.chars().filter(|&c| c == '*').count();
        assert!(masked > 350 && masked < 650, "{} masked", masked);
        assert_eq!(out.chars().count(), 1000);
    }

    #[test]
    fn test_markup_never_masked() {
        let out = mask_text("<i>quiet</i> &lt;3", 1.0, '*', &mut rng());
        assert_eq!(out, "<i>*****</i> &lt;*");
    }

    #[test]
    fn test_snap_example_from_clamp_table() {
        assert_eq!(snap_to_clamp(14.4, &[30, 16, 12, 6]), Some(16));
        assert_eq!(snap_to_clamp(13.9, &[30, 16, 12, 6]), Some(12));
        assert_eq!(snap_to_clamp(100.0, &[30, 16, 12, 6]), Some(30));
        assert_eq!(snap_to_clamp(1.0, &[]), None);
    }

    #[test]
    fn test_snap_tie_prefers_larger() {
        assert_eq!(snap_to_clamp(14.0, &[12, 16]), Some(16));
        assert_eq!(snap_to_clamp(14.0, &[16, 12]), Some(16));
        assert_eq!(snap_to_clamp(9.0, &[6, 12, 30]), Some(12));
    }

    #[test]
    fn test_font_size_interpolation() {
        let clamp = [6, 12, 16, 30];
        // Close by: full default size.
        assert_eq!(font_size(0.0, 35.0, 16, &clamp), Some(16));
        // At or past the edge: the smallest size.
        assert_eq!(font_size(35.0, 35.0, 16, &clamp), Some(6));
        assert_eq!(font_size(80.0, 35.0, 16, &clamp), Some(6));
        // Halfway: 6 + 10 * 0.5 = 11 -> 12.
        assert_eq!(font_size(17.5, 35.0, 16, &clamp), Some(12));
        assert_eq!(font_size(5.0, 35.0, 16, &[]), None);
    }
}
