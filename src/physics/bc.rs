/// One of the four axis directions on the value matrix (rows = y, cols = x).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
    Down,
    Up,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Right,
        Direction::Up,
        Direction::Left,
        Direction::Down,
    ];

    /// `(row, col)` step of one move in this direction.
    pub fn delta(self) -> (isize, isize) {
        match self {
            Direction::Left => (0, -1),
            Direction::Right => (0, 1),
            Direction::Down => (-1, 0),
            Direction::Up => (1, 0),
        }
    }

    /// Cell `distance` moves away from `(row, col)`, if it is inside a
    /// `shape` matrix.
    pub fn walk(
        self,
        (row, col): (usize, usize),
        distance: isize,
        shape: (usize, usize),
    ) -> Option<(usize, usize)> {
        let (dr, dc) = self.delta();
        let r = row as isize + dr * distance;
        let c = col as isize + dc * distance;
        if r < 0 || c < 0 || r >= shape.0 as isize || c >= shape.1 as isize {
            None
        } else {
            Some((r as usize, c as usize))
        }
    }
}

/// One side of a rectangular ghost ring, named by the direction pointing
/// *into* the domain from that side.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Edge {
    /// Column 0.
    Left,
    /// Last column.
    Right,
    /// Row 0.
    Bottom,
    /// Last row.
    Top,
}

impl Edge {
    pub const ALL: [Edge; 4] = [Edge::Left, Edge::Right, Edge::Bottom, Edge::Top];

    pub fn inward(self) -> Direction {
        match self {
            Edge::Left => Direction::Right,
            Edge::Right => Direction::Left,
            Edge::Bottom => Direction::Up,
            Edge::Top => Direction::Down,
        }
    }

    /// Ghost cells along this edge, corners excluded.
    pub fn ghost_cells(self, shape: (usize, usize)) -> Vec<(usize, usize)> {
        let (nr, nc) = shape;
        match self {
            Edge::Left => (1..nr - 1).map(|i| (i, 0)).collect(),
            Edge::Right => (1..nr - 1).map(|i| (i, nc - 1)).collect(),
            Edge::Bottom => (1..nc - 1).map(|j| (0, j)).collect(),
            Edge::Top => (1..nc - 1).map(|j| (nr - 1, j)).collect(),
        }
    }
}

/// Ghost value realizing a convective (Robin) condition with a centred
/// difference across the adjacent interior point:
///
/// `T_ghost = 2 · h · step · (T_adjacent - T_ambient) / k + T_second`
///
/// where `T_second` is the point one further step into the domain.
#[inline]
pub fn convective_ghost_value(
    t_adjacent: f64,
    t_second: f64,
    h: f64,
    step: f64,
    conductivity: f64,
    ambient: f64,
) -> f64 {
    2.0 * h * step * (t_adjacent - ambient) / conductivity + t_second
}
