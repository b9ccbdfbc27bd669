use ndarray::Array2;

/// Morphological opening with a 3x3 square element: `iterations` erosions
/// followed by as many dilations.
///
/// Removes foreground specks and thin bridges narrower than the element
/// while restoring the extent of larger regions.
pub fn opening(mask: &Array2<bool>, iterations: usize) -> Array2<bool> {
    let mut result = mask.clone();
    for _ in 0..iterations {
        result = erode(&result);
    }
    for _ in 0..iterations {
        result = dilate(&result);
    }
    result
}

/// Binary erosion: a pixel stays true only if ALL pixels in its 3x3 neighborhood are true.
/// Out-of-bounds neighbors count as false.
pub fn erode(mask: &Array2<bool>) -> Array2<bool> {
    let (h, w) = mask.dim();
    Array2::from_shape_fn((h, w), |(row, col)| {
        mask[[row, col]]
            && neighbors(h, w, row, col).all(|(r, c)| r.zip(c).is_some_and(|(r, c)| mask[[r, c]]))
    })
}

/// Binary dilation: a pixel becomes true if ANY pixel in its 3x3 neighborhood is true.
pub fn dilate(mask: &Array2<bool>) -> Array2<bool> {
    let (h, w) = mask.dim();
    Array2::from_shape_fn((h, w), |(row, col)| {
        mask[[row, col]]
            || neighbors(h, w, row, col).any(|(r, c)| r.zip(c).is_some_and(|(r, c)| mask[[r, c]]))
    })
}

/// The 8 neighbors of `(row, col)`; coordinates outside the mask are `None`.
fn neighbors(
    h: usize,
    w: usize,
    row: usize,
    col: usize,
) -> impl Iterator<Item = (Option<usize>, Option<usize>)> {
    const OFFSETS: [(i32, i32); 8] = [
        (-1, -1),
        (-1, 0),
        (-1, 1),
        (0, -1),
        (0, 1),
        (1, -1),
        (1, 0),
        (1, 1),
    ];
    OFFSETS.into_iter().map(move |(dr, dc)| {
        let r = row as i32 + dr;
        let c = col as i32 + dc;
        (
            (r >= 0 && r < h as i32).then_some(r as usize),
            (c >= 0 && c < w as i32).then_some(c as usize),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opening_removes_speck_keeps_block() {
        let mut mask = Array2::from_elem((20, 20), false);
        for r in 4..14 {
            for c in 4..14 {
                mask[[r, c]] = true;
            }
        }
        mask[[1, 18]] = true;
        let opened = opening(&mask, 1);
        assert!(!opened[[1, 18]]);
        assert_eq!(opened.iter().filter(|&&v| v).count(), 100);
    }

    #[test]
    fn test_erode_treats_border_as_background() {
        let mask = Array2::from_elem((3, 3), true);
        let eroded = erode(&mask);
        assert_eq!(eroded.iter().filter(|&&v| v).count(), 0);
    }

    #[test]
    fn test_dilate_grows_by_one() {
        let mut mask = Array2::from_elem((5, 5), false);
        mask[[2, 2]] = true;
        assert_eq!(dilate(&mask).iter().filter(|&&v| v).count(), 9);
    }
}
