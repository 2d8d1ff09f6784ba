//! # Collider Rectangles
//!
//! Collision boxes are derived, never stored: the sprite frame gives a base
//! size, the entity's position and a pivot place it, and the entity's
//! [`ColliderOffset`] nudges each edge.

use hearth_shared::{Rect, Vec2};

use super::entity::ColliderOffset;

/// Computes a world-space collision rectangle.
///
/// # Arguments
///
/// * `position` - Entity position
/// * `offset` - Per-edge adjustment; positive values grow the box outward
/// * `frame` - Source frame of the sprite; only its size is used
/// * `origin` - Pivot as a fraction of the scaled frame (0..1 per axis), placed on `position`
/// * `scale` - Per-axis scale applied to the frame size
/// * `extra_offset` - Additional translation, usually `Vec2::ZERO`
#[must_use]
pub fn collider_rect(
    position: Vec2,
    offset: ColliderOffset,
    frame: Rect,
    origin: Vec2,
    scale: Vec2,
    extra_offset: Vec2,
) -> Rect {
    let size = frame.size().mul_elements(scale);
    let top_left = position + extra_offset - origin.mul_elements(size);

    Rect::new(
        top_left.x - offset.left,
        top_left.y - offset.top,
        size.x + offset.left + offset.right,
        size.y + offset.top + offset.bottom,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centered_origin() {
        let rect = collider_rect(
            Vec2::new(100.0, 50.0),
            ColliderOffset::ZERO,
            Rect::new(32.0, 0.0, 16.0, 8.0),
            Vec2::splat(0.5),
            Vec2::ONE,
            Vec2::ZERO,
        );
        assert_eq!(rect, Rect::new(92.0, 46.0, 16.0, 8.0));
    }

    #[test]
    fn test_scale_and_offsets() {
        let rect = collider_rect(
            Vec2::new(10.0, 10.0),
            ColliderOffset::new(1.0, 2.0, 3.0, -4.0),
            Rect::new(0.0, 0.0, 4.0, 4.0),
            Vec2::ZERO,
            Vec2::new(2.0, 3.0),
            Vec2::new(5.0, 0.0),
        );
        // Base box: (15, 10) sized 8x12.
        assert_eq!(rect, Rect::new(14.0, 8.0, 12.0, 10.0));
    }
}
