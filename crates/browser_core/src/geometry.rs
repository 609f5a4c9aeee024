//! Rect math shared by tiles and transitions

use egui::{pos2, Pos2, Rect, Vec2};

/// Scale `size` down until it fits inside `bounds`, keeping its aspect ratio.
/// Never scales up.
pub fn limit_size(size: Vec2, bounds: Vec2) -> Vec2 {
    if size.y <= 0.0 || size.x <= 0.0 {
        return size;
    }
    let aspect = size.x / size.y;
    let width = size.x.min(bounds.x);
    let height = (width / aspect).min(bounds.y);
    Vec2::new(height * aspect, height)
}

pub fn lerp(from: f32, to: f32, t: f32) -> f32 {
    from + (to - from) * t
}

pub fn lerp_rect(from: Rect, to: Rect, t: f32) -> Rect {
    Rect::from_min_max(
        pos2(lerp(from.min.x, to.min.x, t), lerp(from.min.y, to.min.y, t)),
        pos2(lerp(from.max.x, to.max.x, t), lerp(from.max.y, to.max.y, t)),
    )
}

/// Scale `start` by `scale` so that the point grabbed at `anchor` stays under
/// the pointer, which has moved to `location`.
pub fn scale_about_anchor(start: Rect, anchor: Pos2, location: Pos2, scale: f32) -> Rect {
    let size = start.size() * scale;
    let rate_x = if start.width() > 0.0 {
        (anchor.x - start.min.x) / start.width()
    } else {
        0.5
    };
    let rate_y = if start.height() > 0.0 {
        (anchor.y - start.min.y) / start.height()
    } else {
        0.5
    };
    let min = pos2(location.x - size.x * rate_x, location.y - size.y * rate_y);
    Rect::from_min_size(min, size)
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::vec2;

    #[test]
    fn test_limit_size_never_upscales() {
        assert_eq!(limit_size(vec2(100.0, 50.0), vec2(400.0, 800.0)), vec2(100.0, 50.0));
    }

    #[test]
    fn test_limit_size_keeps_aspect() {
        let fitted = limit_size(vec2(2000.0, 1000.0), vec2(400.0, 800.0));
        assert_eq!(fitted, vec2(400.0, 200.0));

        let tall = limit_size(vec2(1000.0, 4000.0), vec2(400.0, 800.0));
        assert_eq!(tall, vec2(200.0, 800.0));
    }

    #[test]
    fn test_scale_about_anchor_tracks_pointer() {
        let start = Rect::from_min_size(pos2(0.0, 100.0), vec2(400.0, 200.0));
        let anchor = pos2(100.0, 150.0);
        let moved = scale_about_anchor(start, anchor, pos2(120.0, 300.0), 0.5);

        assert_eq!(moved.size(), vec2(200.0, 100.0));
        // The grabbed point keeps its relative position inside the frame.
        assert_eq!(moved.min, pos2(120.0 - 50.0, 300.0 - 25.0));
    }

    #[test]
    fn test_lerp_rect_endpoints() {
        let a = Rect::from_min_size(pos2(0.0, 0.0), vec2(10.0, 10.0));
        let b = Rect::from_min_size(pos2(100.0, 50.0), vec2(30.0, 20.0));
        assert_eq!(lerp_rect(a, b, 0.0), a);
        assert_eq!(lerp_rect(a, b, 1.0), b);
    }
}
