//! Path Rasterizer
//!
//! Turns a start cell and a velocity into the ordered cells a vehicle
//! travels through in one turn. Evenly spaced steps, each offset truncated
//! toward zero; this rounding rule decides crash boundaries and must not
//! change.

use crate::core::vec2::GridVec2;

/// Cells visited moving from `start` by `velocity` in one turn.
///
/// Returns `max(|vx|, |vy|) + 1` cells, first `start`, last
/// `start + velocity`. A zero velocity yields just `start`.
pub fn walk_cells(start: GridVec2, velocity: GridVec2) -> Vec<GridVec2> {
    let steps = velocity.max_abs();
    if steps == 0 {
        return vec![start];
    }

    (0..=steps)
        .map(|i| start + velocity.scale_trunc(i, steps))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn v(x: i32, y: i32) -> GridVec2 {
        GridVec2::new(x, y)
    }

    #[test]
    fn test_stationary_is_single_cell() {
        assert_eq!(walk_cells(v(7, 3), GridVec2::ZERO), vec![v(7, 3)]);
    }

    #[test]
    fn test_straight_line() {
        assert_eq!(
            walk_cells(v(1, 3), v(0, 3)),
            vec![v(1, 3), v(1, 4), v(1, 5), v(1, 6)]
        );
    }

    #[test]
    fn test_shallow_slope() {
        assert_eq!(
            walk_cells(v(0, 0), v(5, 2)),
            vec![v(0, 0), v(1, 0), v(2, 0), v(3, 1), v(4, 1), v(5, 2)]
        );
    }

    #[test]
    fn test_negative_components_truncate_toward_zero() {
        // -3 * 1 / 7 = -0.43 -> 0; a floor would give -1
        assert_eq!(
            walk_cells(v(5, 5), v(-3, 7)),
            vec![
                v(5, 5), v(5, 6), v(5, 7), v(4, 8),
                v(4, 9), v(3, 10), v(3, 11), v(2, 12),
            ]
        );
    }

    proptest! {
        #[test]
        fn prop_zero_velocity_is_start(x in -50i32..50, y in -50i32..50) {
            prop_assert_eq!(walk_cells(v(x, y), GridVec2::ZERO), vec![v(x, y)]);
        }

        #[test]
        fn prop_length_and_endpoints(
            x in 0i32..40, y in 0i32..25,
            vx in -12i32..=12, vy in -12i32..=12,
        ) {
            let start = v(x, y);
            let velocity = v(vx, vy);
            let cells = walk_cells(start, velocity);

            prop_assert_eq!(cells.len() as i32, velocity.max_abs() + 1);
            prop_assert_eq!(cells[0], start);
            prop_assert_eq!(*cells.last().unwrap(), start + velocity);
        }

        #[test]
        fn prop_steps_are_adjacent(vx in -12i32..=12, vy in -12i32..=12) {
            let cells = walk_cells(GridVec2::ZERO, v(vx, vy));
            for pair in cells.windows(2) {
                prop_assert!((pair[1] - pair[0]).max_abs() <= 1);
            }
        }
    }
}
