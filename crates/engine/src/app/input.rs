#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

const DIRECTION_COUNT: usize = 4;

/// Order in which held keys are honored when more than one is down.
pub const DIRECTION_PRECEDENCE: [Direction; DIRECTION_COUNT] = [
    Direction::Left,
    Direction::Right,
    Direction::Up,
    Direction::Down,
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DirectionStates {
    down: [bool; DIRECTION_COUNT],
}

impl DirectionStates {
    pub fn set(&mut self, direction: Direction, is_down: bool) {
        self.down[direction.index()] = is_down;
    }

    pub fn with_down(mut self, direction: Direction) -> Self {
        self.set(direction, true);
        self
    }

    pub fn is_down(&self, direction: Direction) -> bool {
        self.down[direction.index()]
    }

    pub fn dominant(&self) -> Option<Direction> {
        DIRECTION_PRECEDENCE
            .into_iter()
            .find(|direction| self.is_down(*direction))
    }
}

impl Direction {
    const fn index(self) -> usize {
        match self {
            Direction::Up => 0,
            Direction::Down => 1,
            Direction::Left => 2,
            Direction::Right => 3,
        }
    }
}
