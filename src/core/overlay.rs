//! Face overlay geometry
//!
//! Stateless: landmarks and the dominant emoji in, draw instructions out.

use crate::types::{Face, FaceOverlay, OverlayDot, OverlayLabel};

/// Landmark the emoji label is anchored to
pub const EMOJI_ANCHOR_POINT: usize = 4;

const DOT_RADIUS: f64 = 1.0;
const DOT_COLOR: &str = "white";
const EMOJI_FONT: &str = "48px sans-serif";

/// Build the overlay for one face: a dot per landmark plus the emoji label
pub fn face_overlay(face: &Face) -> FaceOverlay {
    let dots = face
        .feature_points
        .iter()
        .map(|p| OverlayDot {
            x: p.x,
            y: p.y,
            radius: DOT_RADIUS,
            color: DOT_COLOR.to_string(),
        })
        .collect();

    let label = match (face.dominant_emoji(), face.feature_points.get(EMOJI_ANCHOR_POINT)) {
        (Some(glyph), Some(anchor)) => Some(OverlayLabel {
            text: glyph.to_string(),
            x: anchor.x,
            y: anchor.y,
            font: EMOJI_FONT.to_string(),
        }),
        _ => None,
    };

    FaceOverlay { dots, label }
}
