use crate::components::Direction;

/// Holds a turn the player asked for until it becomes legal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DirectionBuffer {
    requested: Direction,
}

impl DirectionBuffer {
    pub fn request(&mut self, dir: Direction) {
        self.requested = dir;
    }

    pub fn requested(&self) -> Direction {
        self.requested
    }

    /// Swaps the pending request into `current` if `is_legal` accepts it.
    /// An illegal request keeps waiting and leaves `current` untouched.
    pub fn apply(&mut self, current: &mut Direction, is_legal: impl Fn(Direction) -> bool) -> bool {
        if self.requested.is_none() || !is_legal(self.requested) {
            return false;
        }
        *current = self.requested;
        self.requested = Direction::None;
        true
    }

    pub fn clear(&mut self) {
        self.requested = Direction::None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legal_request_applies_and_clears() {
        let mut buffer = DirectionBuffer::default();
        let mut current = Direction::Right;
        buffer.request(Direction::Up);
        assert!(buffer.apply(&mut current, |_| true));
        assert_eq!(current, Direction::Up);
        assert_eq!(buffer.requested(), Direction::None);
    }

    #[test]
    fn test_illegal_request_waits() {
        let mut buffer = DirectionBuffer::default();
        let mut current = Direction::Right;
        buffer.request(Direction::Up);
        for _ in 0..1000 {
            assert!(!buffer.apply(&mut current, |dir| dir != Direction::Up));
            assert_eq!(current, Direction::Right);
        }
        assert_eq!(buffer.requested(), Direction::Up);
        assert!(buffer.apply(&mut current, |_| true));
        assert_eq!(current, Direction::Up);
    }

    #[test]
    fn test_empty_request_is_noop() {
        let mut buffer = DirectionBuffer::default();
        let mut current = Direction::Left;
        assert!(!buffer.apply(&mut current, |_| true));
        assert_eq!(current, Direction::Left);
    }
}
