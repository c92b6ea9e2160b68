//! Near plane clipping before the perspective divide, NDC box clipping of lines after it, and
//! the mapping between NDC and screen pixels.

use crate::{vec::Vec2, Vertex};

/// Result of clipping a triangle against the near plane (`z = 0` in clip space).
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum NearClip {
    /// Every vertex was behind the plane.
    Culled,
    /// Nothing behind the plane, or two vertices pulled onto it.
    One([Vertex; 3]),
    /// One vertex behind the plane; the remaining quad split in two.
    Split([[Vertex; 3]; 2]),
}

impl NearClip {
    pub fn triangles(&self) -> &[[Vertex; 3]] {
        match self {
            NearClip::Culled => &[],
            NearClip::One(tri) => std::slice::from_ref(tri),
            NearClip::Split(tris) => tris,
        }
    }
}

fn behind(v: &Vertex) -> bool {
    v.position.z < 0.
}

/// Moves `behind` along the edge towards `front` until it lies on the near plane.
fn pull_to_near(behind: &Vertex, front: &Vertex) -> Vertex {
    let ratio = behind.position.z / (behind.position.z - front.position.z);
    behind.lerp(front, ratio)
}

/// Clips the segment `a`-`b` against the near plane. Returns `false` when both endpoints are
/// behind it and nothing is left to draw.
pub fn clip_line_near(a: &mut Vertex, b: &mut Vertex) -> bool {
    match (behind(a), behind(b)) {
        (true, true) => false,
        (true, false) => {
            *a = pull_to_near(a, b);
            true
        }
        (false, true) => {
            *b = pull_to_near(b, a);
            true
        }
        (false, false) => true,
    }
}

/// Clips a clip-space triangle against the near plane, keeping the winding of `tri`.
pub fn clip_triangle_near(tri: [Vertex; 3]) -> NearClip {
    let flags = tri.each_ref().map(behind);
    let rotated = |first: usize| [tri[first], tri[(first + 1) % 3], tri[(first + 2) % 3]];

    match flags.iter().filter(|&&b| b).count() {
        0 => NearClip::One(tri),
        1 => {
            let first = flags.iter().position(|&b| b).unwrap_or(0);
            let [p, q, r] = rotated(first);
            let towards_q = pull_to_near(&p, &q);
            let towards_r = pull_to_near(&p, &r);
            NearClip::Split([[towards_q, q, r], [towards_q, r, towards_r]])
        }
        2 => {
            let first = flags.iter().position(|&b| !b).unwrap_or(0);
            let [front, q, r] = rotated(first);
            NearClip::One([front, pull_to_near(&q, &front), pull_to_near(&r, &front)])
        }
        _ => NearClip::Culled,
    }
}

/// Post-divide clip of a line against `x = ±1` and `y = ±1`, one boundary at a time. Returns
/// `false` when the line lies entirely outside one of them.
pub fn clip_line_ndc(a: &mut Vertex, b: &mut Vertex) -> bool {
    for axis in [0, 1] {
        for side in [1.0f32, -1.0] {
            // Signed distance past the boundary, positive outside.
            let dist = |v: &Vertex| side * v.position[(0, axis)] - 1.;
            let (da, db) = (dist(a), dist(b));
            if da > 0. && db > 0. {
                return false;
            }
            if da > 0. {
                *a = a.lerp(b, da / (da - db));
            } else if db > 0. {
                *b = b.lerp(a, db / (db - da));
            }
        }
    }
    true
}

/// Maps NDC to whole pixel coordinates, `y` pointing down.
pub fn ndc_to_screen(ndc: Vec2, width: usize, height: usize) -> Vec2 {
    Vec2::from([
        ((ndc.x + 1.) * 0.5 * (width as f32 - 1.)).floor(),
        ((1. - ndc.y) * 0.5 * (height as f32 - 1.)).floor(),
    ])
}

pub fn screen_to_ndc(screen: Vec2, width: usize, height: usize) -> Vec2 {
    Vec2::from([
        screen.x / (0.5 * (width as f32 - 1.)) - 1.,
        1. - screen.y / (0.5 * (height as f32 - 1.)),
    ])
}
