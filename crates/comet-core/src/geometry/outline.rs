use ndarray::Array2;

/// Trace the outer pixel-edge boundary of the first 8-connected component
/// in raster order.
///
/// Vertices are pixel corners relative to the mask origin, emitted only where
/// the boundary changes direction. The walk keeps the region on its right,
/// so the polygon runs clockwise on screen.
pub fn trace_outline(mask: &Array2<bool>) -> Vec<(i32, i32)> {
    let start = mask
        .indexed_iter()
        .find(|(_, &set)| set)
        .map(|((row, col), _)| (col as i32, row as i32));
    let Some(start) = start else {
        return Vec::new();
    };

    let inside = |x: i32, y: i32| -> bool {
        x >= 0 && y >= 0 && mask.get((y as usize, x as usize)).copied().unwrap_or(false)
    };

    let mut vertices = vec![start];
    let (mut vx, mut vy) = start;
    let (mut dx, mut dy) = (1i32, 0i32);
    // Every outer edge is walked at most once.
    let limit = 4 * mask.len() + 4;

    for _ in 0..limit {
        vx += dx;
        vy += dy;

        let (rx, ry) = (-dy, dx);
        let ahead_left = (vx.min(vx + dx - rx), vy.min(vy + dy - ry));
        let ahead_right = (vx.min(vx + dx + rx), vy.min(vy + dy + ry));

        let (ndx, ndy) = if inside(ahead_left.0, ahead_left.1) {
            (dy, -dx)
        } else if inside(ahead_right.0, ahead_right.1) {
            (dx, dy)
        } else {
            (-dy, dx)
        };

        if (vx, vy) == start && (ndx, ndy) == (1, 0) {
            break;
        }
        if (ndx, ndy) != (dx, dy) {
            vertices.push((vx, vy));
        }
        dx = ndx;
        dy = ndy;
    }
    vertices
}

/// Perimeter of a traced pixel-edge outline.
///
/// Straight runs count 1 per pixel edge and isolated corners count sqrt(2)
/// for the two edges they join, so each such corner subtracts `2 - sqrt(2)`
/// from the crack length.
pub fn traced_perimeter(vertices: &[(i32, i32)]) -> f64 {
    let n = vertices.len();
    if n < 2 {
        return 0.0;
    }

    let mut sum_dx = 0i64;
    let mut sum_dy = 0i64;
    let mut corners = 0u32;
    let mut corner = false;

    let (mut dx1, mut dy1) = (
        vertices[0].0 - vertices[n - 1].0,
        vertices[0].1 - vertices[n - 1].1,
    );
    let mut side1 = dx1.abs() + dy1.abs();

    for i in 0..n {
        let next = (i + 1) % n;
        let dx2 = vertices[next].0 - vertices[i].0;
        let dy2 = vertices[next].1 - vertices[i].1;
        sum_dx += dx1.abs() as i64;
        sum_dy += dy1.abs() as i64;
        let side2 = dx2.abs() + dy2.abs();
        if side1 > 1 || !corner {
            corner = true;
            corners += 1;
        } else {
            corner = false;
        }
        dx1 = dx2;
        dy1 = dy2;
        side1 = side2;
    }

    (sum_dx + sum_dy) as f64 - corners as f64 * (2.0 - std::f64::consts::SQRT_2)
}
