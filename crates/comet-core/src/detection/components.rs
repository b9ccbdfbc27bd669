use ndarray::{s, Array2};

use crate::geometry::Region;

use super::config::ParticleFilter;

/// Statistics for a single connected component.
#[derive(Clone, Debug)]
pub struct ComponentStats {
    /// Unique label for this component.
    pub label: u32,
    /// Number of pixels in the component.
    pub area: usize,
    /// Bounding box: (min_row, max_row, min_col, max_col).
    pub bbox: (usize, usize, usize, usize),
}

/// Label image plus the components found in it.
#[derive(Clone, Debug)]
pub struct Labeling {
    /// Resolved label per pixel; 0 is background.
    pub labels: Array2<u32>,
    /// Components in raster discovery order of their first pixel.
    pub components: Vec<ComponentStats>,
}

/// Perform connected component analysis on a binary mask using two-pass
/// labeling with union-find. Uses 8-connectivity (upper-left, upper,
/// upper-right and left neighbors).
pub fn connected_components(mask: &Array2<bool>) -> Labeling {
    let (h, w) = mask.dim();
    let mut labels = Array2::<u32>::zeros((h, w));
    if h == 0 || w == 0 {
        return Labeling {
            labels,
            components: Vec::new(),
        };
    }

    // Union-find parent array. Index 0 unused; labels start at 1.
    let mut parent: Vec<u32> = vec![0];

    // Pass 1: assign provisional labels.
    for row in 0..h {
        for col in 0..w {
            if !mask[[row, col]] {
                continue;
            }

            let mut neighbors = [0u32; 4];
            if row > 0 {
                if col > 0 {
                    neighbors[0] = labels[[row - 1, col - 1]];
                }
                neighbors[1] = labels[[row - 1, col]];
                if col + 1 < w {
                    neighbors[2] = labels[[row - 1, col + 1]];
                }
            }
            if col > 0 {
                neighbors[3] = labels[[row, col - 1]];
            }

            let smallest = neighbors.iter().copied().filter(|&l| l > 0).min();
            match smallest {
                None => {
                    let label = parent.len() as u32;
                    parent.push(label);
                    labels[[row, col]] = label;
                }
                Some(smallest) => {
                    labels[[row, col]] = smallest;
                    for &other in neighbors.iter().filter(|&&l| l > 0 && l != smallest) {
                        union(&mut parent, smallest, other);
                    }
                }
            }
        }
    }

    // Flatten parent references.
    for i in 1..parent.len() {
        parent[i] = find(&parent, i as u32);
    }

    // Pass 2: resolve labels and collect stats in discovery order.
    let mut index_of_root = vec![usize::MAX; parent.len()];
    let mut components: Vec<ComponentStats> = Vec::new();

    for row in 0..h {
        for col in 0..w {
            let lbl = labels[[row, col]];
            if lbl == 0 {
                continue;
            }
            let root = parent[lbl as usize];
            labels[[row, col]] = root;

            let idx = &mut index_of_root[root as usize];
            if *idx == usize::MAX {
                *idx = components.len();
                components.push(ComponentStats {
                    label: root,
                    area: 0,
                    bbox: (row, row, col, col),
                });
            }
            let entry = &mut components[*idx];
            entry.area += 1;
            entry.bbox.0 = entry.bbox.0.min(row);
            entry.bbox.1 = entry.bbox.1.max(row);
            entry.bbox.2 = entry.bbox.2.min(col);
            entry.bbox.3 = entry.bbox.3.max(col);
        }
    }

    Labeling { labels, components }
}

/// Extract particles from a foreground mask as regions, in raster discovery
/// order, keeping only those that pass `filter`.
///
/// With `include_holes`, each particle is claimed together with its filled
/// holes, so components lying inside another particle's hole are never
/// reported on their own. A particle claims its area whether or not it
/// passes the filter.
pub fn extract_particles(mask: &Array2<bool>, filter: &ParticleFilter) -> Vec<Region> {
    let (h, w) = mask.dim();
    let labeling = connected_components(mask);
    let mut claimed = Array2::from_elem((h, w), false);

    let mut particles = Vec::new();
    for component in &labeling.components {
        let (r0, r1, c0, c1) = component.bbox;
        let mut particle = labeling
            .labels
            .slice(s![r0..=r1, c0..=c1])
            .mapv(|l| l == component.label);

        let inside_hole = particle
            .iter()
            .zip(claimed.slice(s![r0..=r1, c0..=c1]).iter())
            .any(|(&own, &taken)| own && taken);
        if inside_hole {
            continue;
        }
        if filter.include_holes {
            particle = fill_holes(&particle);
            claimed
                .slice_mut(s![r0..=r1, c0..=c1])
                .zip_mut_with(&particle, |taken, &own| *taken |= own);
        }

        if filter.exclude_edges && touches_border(component.bbox, h, w) {
            continue;
        }

        let region = Region::from_mask(c0 as i32, r0 as i32, particle);
        let area = region.area();
        if area < filter.min_area || filter.max_area.is_some_and(|max| area > max) {
            continue;
        }
        if filter.min_circularity > 0.0 || filter.max_circularity < 1.0 {
            let perimeter = region.perimeter();
            let circularity = if perimeter > 0.0 {
                (4.0 * std::f64::consts::PI * area as f64 / (perimeter * perimeter)).min(1.0)
            } else {
                0.0
            };
            if circularity < filter.min_circularity || circularity > filter.max_circularity {
                continue;
            }
        }
        particles.push(region);
    }
    particles
}

/// Fill background pockets not 4-connected to the border of the mask.
pub fn fill_holes(mask: &Array2<bool>) -> Array2<bool> {
    let (h, w) = mask.dim();
    // Pad by one so the outside is a single connected background.
    let (ph, pw) = (h + 2, w + 2);
    let mut outside = Array2::from_elem((ph, pw), false);
    let is_fg = |r: usize, c: usize| r >= 1 && c >= 1 && r <= h && c <= w && mask[[r - 1, c - 1]];

    let mut stack = vec![(0usize, 0usize)];
    outside[[0, 0]] = true;
    while let Some((r, c)) = stack.pop() {
        let mut visit = |nr: usize, nc: usize| {
            if !outside[[nr, nc]] && !is_fg(nr, nc) {
                outside[[nr, nc]] = true;
                stack.push((nr, nc));
            }
        };
        if r > 0 {
            visit(r - 1, c);
        }
        if r + 1 < ph {
            visit(r + 1, c);
        }
        if c > 0 {
            visit(r, c - 1);
        }
        if c + 1 < pw {
            visit(r, c + 1);
        }
    }

    Array2::from_shape_fn((h, w), |(r, c)| !outside[[r + 1, c + 1]])
}

/// Returns true if the component's bounding box touches any edge of the image.
pub fn touches_border(bbox: (usize, usize, usize, usize), height: usize, width: usize) -> bool {
    let (min_row, max_row, min_col, max_col) = bbox;
    min_row == 0 || max_row >= height - 1 || min_col == 0 || max_col >= width - 1
}

fn find(parent: &[u32], mut x: u32) -> u32 {
    while parent[x as usize] != x {
        x = parent[x as usize];
    }
    x
}

fn union(parent: &mut [u32], a: u32, b: u32) {
    let ra = find(parent, a);
    let rb = find(parent, b);
    if ra != rb {
        // Merge larger root into smaller root to keep labels consistent.
        let (small, big) = if ra < rb { (ra, rb) } else { (rb, ra) };
        parent[big as usize] = small;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagonal_neighbors_join() {
        let mut mask = Array2::from_elem((4, 4), false);
        mask[[0, 0]] = true;
        mask[[1, 1]] = true;
        mask[[2, 2]] = true;
        mask[[0, 3]] = true;
        let labeling = connected_components(&mask);
        assert_eq!(labeling.components.len(), 2);
        assert_eq!(labeling.components[0].area, 3);
        assert_eq!(labeling.components[1].area, 1);
    }

    #[test]
    fn test_v_shape_merges_late() {
        // Two arms meeting at the bottom get one label.
        let mut mask = Array2::from_elem((3, 5), false);
        mask[[0, 0]] = true;
        mask[[0, 4]] = true;
        mask[[1, 1]] = true;
        mask[[1, 3]] = true;
        mask[[2, 2]] = true;
        let labeling = connected_components(&mask);
        assert_eq!(labeling.components.len(), 1);
        assert_eq!(labeling.components[0].area, 5);
        assert!(labeling.labels.iter().all(|&l| l == 0 || l == labeling.components[0].label));
    }

    #[test]
    fn test_fill_holes_closes_ring() {
        let mut ring = Array2::from_elem((5, 5), true);
        ring[[2, 2]] = false;
        let filled = fill_holes(&ring);
        assert!(filled.iter().all(|&v| v));

        let mut notch = Array2::from_elem((3, 3), true);
        notch[[0, 1]] = false;
        assert!(!fill_holes(&notch)[[0, 1]]);
    }
}
