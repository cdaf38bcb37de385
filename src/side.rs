/// The side of a node a child hangs from.
///
/// Rotations and fix-ups are written once in terms of a `Side` and its opposite instead of as
/// separate left and right mirrors.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn opposite(self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}
