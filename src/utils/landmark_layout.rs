//! Landmark placement along the two vertical edges of the world

use crate::common::error::{invalid_config, LocalizationResult};
use crate::common::Landmark;

/// Default distance kept between landmarks and the world border
pub const BORDER_MARGIN: f64 = 50.0;

/// Place `count` landmarks on two columns, `margin` in from the left and
/// right edges, with rows spread from `margin` to `height - margin`.
///
/// Points are emitted column by column and truncated to `count`.
pub fn prepare_landmarks(count: usize, width: f64, height: f64, margin: f64) -> LocalizationResult<Vec<Landmark>> {
    if count == 0 {
        return invalid_config("landmark count must be at least 1");
    }
    if !(width.is_finite() && width > 0.0 && height.is_finite() && height > 0.0) {
        return invalid_config(format!("world {}x{} must have positive size", width, height));
    }
    if !(margin.is_finite() && margin >= 0.0) {
        return invalid_config(format!("border margin must be non-negative, got {}", margin));
    }
    if width <= 2.0 * margin || height <= 2.0 * margin {
        return invalid_config(format!(
            "world {}x{} too small for a border margin of {}: landmarks would coincide",
            width, height, margin
        ));
    }

    let columns = [margin, width - margin];
    let rows: Vec<f64> = if count <= 2 {
        vec![height / 2.0]
    } else {
        let half = (count + 1) / 2 - 1;
        let spacing = (height - 2.0 * margin) / half as f64;
        std::iter::once(margin)
            .chain((1..half).map(|i| margin + spacing * i as f64))
            .chain(std::iter::once(height - margin))
            .collect()
    };

    Ok(columns
        .iter()
        .flat_map(|&x| rows.iter().map(move |&y| Landmark::new(x, y)))
        .take(count)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::LocalizationError;

    #[test]
    fn test_two_per_vertical_edge() {
        let lms = prepare_landmarks(4, 900.0, 400.0, BORDER_MARGIN).unwrap();
        assert_eq!(
            lms,
            vec![
                Landmark::new(50.0, 50.0),
                Landmark::new(50.0, 350.0),
                Landmark::new(850.0, 50.0),
                Landmark::new(850.0, 350.0),
            ]
        );
    }

    #[test]
    fn test_small_counts_use_middle_row() {
        let one = prepare_landmarks(1, 900.0, 400.0, 50.0).unwrap();
        assert_eq!(one, vec![Landmark::new(50.0, 200.0)]);

        let two = prepare_landmarks(2, 900.0, 400.0, 50.0).unwrap();
        assert_eq!(two, vec![Landmark::new(50.0, 200.0), Landmark::new(850.0, 200.0)]);
    }

    #[test]
    fn test_odd_count_truncates_last_column() {
        let lms = prepare_landmarks(3, 900.0, 400.0, 50.0).unwrap();
        assert_eq!(
            lms,
            vec![Landmark::new(50.0, 50.0), Landmark::new(50.0, 350.0), Landmark::new(850.0, 50.0)]
        );
    }

    #[test]
    fn test_many_landmarks_are_distinct_and_inside() {
        for count in 1..40 {
            let lms = prepare_landmarks(count, 900.0, 400.0, 50.0).unwrap();
            assert_eq!(lms.len(), count);
            for (i, a) in lms.iter().enumerate() {
                assert!(a.x > 0.0 && a.x < 900.0 && a.y > 0.0 && a.y < 400.0);
                assert!(lms[i + 1..].iter().all(|b| b != a), "duplicate at count {}", count);
            }
        }
    }

    #[test]
    fn test_rejects_impossible_layouts() {
        for result in [
            prepare_landmarks(0, 900.0, 400.0, 50.0),
            prepare_landmarks(4, 0.0, 400.0, 50.0),
            prepare_landmarks(4, 900.0, 100.0, 50.0),
            prepare_landmarks(4, 90.0, 400.0, 50.0),
        ] {
            assert!(matches!(result, Err(LocalizationError::InvalidConfiguration(_))));
        }
    }
}
