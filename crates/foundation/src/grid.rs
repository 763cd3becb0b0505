/// Dense row-major 2-D grid.
///
/// Row `y` occupies `data[y * width .. (y + 1) * width]`. Amplitude slices,
/// attribute outputs and interpolated maps all use this layout so the
/// rendering side can consume `as_slice()` directly.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid<T> {
    width: usize,
    height: usize,
    data: Vec<T>,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct GridShapeError {
    pub expected: usize,
    pub found: usize,
}

impl std::fmt::Display for GridShapeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "grid data length {} does not match width*height {}",
            self.found, self.expected
        )
    }
}

impl std::error::Error for GridShapeError {}

impl<T: Copy + Default> Grid<T> {
    pub fn filled(width: usize, height: usize, value: T) -> Self {
        Self {
            width,
            height,
            data: vec![value; width * height],
        }
    }

    pub fn zeros(width: usize, height: usize) -> Self {
        Self::filled(width, height, T::default())
    }

    pub fn from_fn(width: usize, height: usize, mut f: impl FnMut(usize, usize) -> T) -> Self {
        let mut data = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                data.push(f(x, y));
            }
        }
        Self {
            width,
            height,
            data,
        }
    }

    /// Builds a grid from nested rows.
    ///
    /// Panics if the rows are ragged: a non-rectangular grid is a caller bug.
    pub fn from_rows(rows: Vec<Vec<T>>) -> Self {
        let height = rows.len();
        let width = rows.first().map(|r| r.len()).unwrap_or(0);
        let mut data = Vec::with_capacity(width * height);
        for (y, row) in rows.into_iter().enumerate() {
            assert_eq!(row.len(), width, "ragged grid at row {y}");
            data.extend(row);
        }
        Self {
            width,
            height,
            data,
        }
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Option<T> {
        if x < self.width && y < self.height {
            Some(self.data[y * self.width + x])
        } else {
            None
        }
    }
}

impl<T> Grid<T> {
    pub fn from_vec(width: usize, height: usize, data: Vec<T>) -> Result<Self, GridShapeError> {
        if data.len() != width * height {
            return Err(GridShapeError {
                expected: width * height,
                found: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    pub fn row(&self, y: usize) -> &[T] {
        &self.data[y * self.width..(y + 1) * self.width]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[T]> {
        // chunks_exact(0) panics; an empty grid has no rows either way.
        self.data.chunks_exact(self.width.max(1)).take(self.height)
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, value: T) {
        let w = self.width;
        self.data[y * w + x] = value;
    }
}

impl<T> std::ops::Index<(usize, usize)> for Grid<T> {
    type Output = T;

    /// Indexed as `(x, y)`.
    #[inline]
    fn index(&self, (x, y): (usize, usize)) -> &T {
        debug_assert!(x < self.width && y < self.height);
        &self.data[y * self.width + x]
    }
}

#[cfg(test)]
mod tests {
    use super::Grid;

    #[test]
    fn row_major_layout() {
        let g = Grid::from_fn(3, 2, |x, y| (y * 10 + x) as i32);
        assert_eq!(g.as_slice(), &[0, 1, 2, 10, 11, 12]);
        assert_eq!(g.row(1), &[10, 11, 12]);
        assert_eq!(g[(2, 1)], 12);
        assert_eq!(g.get(3, 0), None);
    }

    #[test]
    fn from_vec_checks_length() {
        assert!(Grid::from_vec(2, 2, vec![0.0f32; 3]).is_err());
        let g = Grid::from_vec(2, 2, vec![1.0f32; 4]).unwrap();
        assert_eq!(g.rows().count(), 2);
    }

    #[test]
    #[should_panic]
    fn ragged_rows_fail_fast() {
        let _ = Grid::from_rows(vec![vec![1, 2], vec![3]]);
    }
}
