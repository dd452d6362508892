//! Ramer–Douglas–Peucker simplification over squared distances.

/// Simplifies a line or ring.
///
/// `sq_tolerance` is the squared distance below which vertices are dropped.
/// When `min_vertices` is positive and the result would keep that many
/// vertices or fewer, the tolerance is halved and the input re-simplified
/// until more vertices survive or the tolerance underflows to zero. A
/// `min_vertices` of 3 guarantees that closed rings keep at least four
/// vertices including the closure.
pub fn simplify(coords: &[[f64; 2]], sq_tolerance: f64, min_vertices: usize) -> Vec<[f64; 2]> {
	if coords.len() <= min_vertices.max(1) {
		return coords.to_vec();
	}

	let mut sq_tolerance = sq_tolerance;
	loop {
		let simplified = simplify_recursive(coords, sq_tolerance);
		if simplified.len() > min_vertices {
			return simplified;
		}
		sq_tolerance /= 2.0;
		if sq_tolerance == 0.0 {
			// tolerance underflow, keep the input as-is
			return coords.to_vec();
		}
	}
}

fn simplify_recursive(coords: &[[f64; 2]], sq_tolerance: f64) -> Vec<[f64; 2]> {
	let last = coords.len() - 1;
	let mut max_sq_dist = 0.0;
	let mut index = None;

	for i in 1..last {
		let sq_dist = sq_seg_dist(
			coords[i][0],
			coords[i][1],
			coords[0][0],
			coords[0][1],
			coords[last][0],
			coords[last][1],
		);
		if sq_dist > max_sq_dist {
			index = Some(i);
			max_sq_dist = sq_dist;
		}
	}

	match index {
		Some(i) if max_sq_dist > sq_tolerance && sq_tolerance > 0.0 => {
			let mut left = simplify_recursive(&coords[..=i], sq_tolerance);
			let right = simplify_recursive(&coords[i..], sq_tolerance);
			// the last point of the left half is the first of the right
			left.pop();
			left.extend(right);
			left
		}
		_ => vec![coords[0], coords[last]],
	}
}

/// Squared distance from `(px, py)` to the segment `(x, y)..(bx, by)`.
fn sq_seg_dist(px: f64, py: f64, mut x: f64, mut y: f64, bx: f64, by: f64) -> f64 {
	let mut dx = bx - x;
	let mut dy = by - y;

	if dx != 0.0 || dy != 0.0 {
		let t = ((px - x) * dx + (py - y) * dy) / (dx * dx + dy * dy);
		if t > 1.0 {
			x = bx;
			y = by;
		} else if t > 0.0 {
			x += dx * t;
			y += dy * t;
		}
	}

	dx = px - x;
	dy = py - y;
	dx * dx + dy * dy
}
