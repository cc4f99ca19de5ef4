//! Axis, quarter-turn rotation, and direction primitives shared by the
//! blueprint transform engine and by schematics updating their own facing.

use glam::{DVec3, IVec3};

/// One of the three principal axes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    /// All axes in X, Y, Z order.
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    /// Returns the component of `v` along this axis.
    pub fn component(self, v: IVec3) -> i32 {
        match self {
            Axis::X => v.x,
            Axis::Y => v.y,
            Axis::Z => v.z,
        }
    }

    /// Returns `v` with the component along this axis replaced by `value`.
    pub fn with_component(self, v: IVec3, value: i32) -> IVec3 {
        match self {
            Axis::X => IVec3::new(value, v.y, v.z),
            Axis::Y => IVec3::new(v.x, value, v.z),
            Axis::Z => IVec3::new(v.x, v.y, value),
        }
    }

    /// Lowercase name as used in block-state properties (`"x"`, `"y"`, `"z"`).
    pub fn name(self) -> &'static str {
        match self {
            Axis::X => "x",
            Axis::Y => "y",
            Axis::Z => "z",
        }
    }

    /// Parses a lowercase axis name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "x" => Some(Axis::X),
            "y" => Some(Axis::Y),
            "z" => Some(Axis::Z),
            _ => None,
        }
    }

    /// Unit vector pointing along the positive side of this axis.
    pub fn unit(self) -> IVec3 {
        match self {
            Axis::X => IVec3::X,
            Axis::Y => IVec3::Y,
            Axis::Z => IVec3::Z,
        }
    }

    /// Returns the axis a unit vector lies on, ignoring its sign.
    fn of_unit(v: IVec3) -> Option<Self> {
        let v = v.abs();
        Self::ALL.into_iter().find(|axis| axis.unit() == v)
    }
}

/// A rotation by a multiple of 90° about some axis.
///
/// Clockwise is taken looking from the positive end of the axis towards the
/// origin, so a clockwise turn about Y maps north to east.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum Rotation {
    #[default]
    None,
    Clockwise90,
    Clockwise180,
    CounterClockwise90,
}

impl Rotation {
    /// All rotations in increasing quarter-turn order.
    pub const ALL: [Rotation; 4] = [
        Rotation::None,
        Rotation::Clockwise90,
        Rotation::Clockwise180,
        Rotation::CounterClockwise90,
    ];

    /// Number of clockwise quarter turns (0..4).
    pub fn quarter_turns(self) -> i32 {
        match self {
            Rotation::None => 0,
            Rotation::Clockwise90 => 1,
            Rotation::Clockwise180 => 2,
            Rotation::CounterClockwise90 => 3,
        }
    }

    /// Builds a rotation from any number of clockwise quarter turns.
    /// Negative values turn counter-clockwise.
    pub fn from_quarter_turns(turns: i32) -> Self {
        Self::ALL[turns.rem_euclid(4) as usize]
    }

    /// The rotation that undoes this one.
    pub fn inverse(self) -> Self {
        Self::from_quarter_turns(-self.quarter_turns())
    }

    /// Applying `self` then `other` about the same axis.
    pub fn compose(self, other: Rotation) -> Self {
        Self::from_quarter_turns(self.quarter_turns() + other.quarter_turns())
    }
}

/// Rotates an integer position about the origin.
pub fn rotate_pos(pos: IVec3, axis: Axis, rotation: Rotation) -> IVec3 {
    let mut p = pos;
    for _ in 0..rotation.quarter_turns() {
        p = match axis {
            Axis::X => IVec3::new(p.x, -p.z, p.y),
            Axis::Y => IVec3::new(-p.z, p.y, p.x),
            Axis::Z => IVec3::new(-p.y, p.x, p.z),
        };
    }
    p
}

/// Rotates a continuous position about the origin. Same transform as
/// [`rotate_pos`].
pub fn rotate_vec(pos: DVec3, axis: Axis, rotation: Rotation) -> DVec3 {
    let mut p = pos;
    for _ in 0..rotation.quarter_turns() {
        p = match axis {
            Axis::X => DVec3::new(p.x, -p.z, p.y),
            Axis::Y => DVec3::new(-p.z, p.y, p.x),
            Axis::Z => DVec3::new(-p.y, p.x, p.z),
        };
    }
    p
}

/// Closest point to `point` inside the inclusive box `[min, max]`.
pub fn closest_inside(point: IVec3, min: IVec3, max: IVec3) -> IVec3 {
    point.clamp(min, max)
}

/// One of the six block faces.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Down,
    Up,
    North,
    South,
    West,
    East,
}

impl Direction {
    pub const ALL: [Direction; 6] = [
        Direction::Down,
        Direction::Up,
        Direction::North,
        Direction::South,
        Direction::West,
        Direction::East,
    ];

    /// Name as stored in a `facing` block property.
    pub fn name(self) -> &'static str {
        match self {
            Direction::Down => "down",
            Direction::Up => "up",
            Direction::North => "north",
            Direction::South => "south",
            Direction::West => "west",
            Direction::East => "east",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.name() == name)
    }

    /// Unit vector of this face. North is -Z, east is +X, up is +Y.
    pub fn vector(self) -> IVec3 {
        match self {
            Direction::Down => IVec3::NEG_Y,
            Direction::Up => IVec3::Y,
            Direction::North => IVec3::NEG_Z,
            Direction::South => IVec3::Z,
            Direction::West => IVec3::NEG_X,
            Direction::East => IVec3::X,
        }
    }

    pub fn from_vector(v: IVec3) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.vector() == v)
    }

    pub fn axis(self) -> Axis {
        match self {
            Direction::Down | Direction::Up => Axis::Y,
            Direction::North | Direction::South => Axis::Z,
            Direction::West | Direction::East => Axis::X,
        }
    }

    pub fn rotate(self, axis: Axis, rotation: Rotation) -> Self {
        Self::from_vector(rotate_pos(self.vector(), axis, rotation)).unwrap_or(self)
    }

    /// Reflects the direction across the plane perpendicular to `axis`.
    pub fn mirror(self, axis: Axis) -> Self {
        if self.axis() == axis {
            Self::from_vector(-self.vector()).unwrap_or(self)
        } else {
            self
        }
    }
}

/// Rotates an axis-valued property (e.g. a log's `axis=x`).
pub fn rotate_axis(value: Axis, axis: Axis, rotation: Rotation) -> Axis {
    Axis::of_unit(rotate_pos(value.unit(), axis, rotation)).unwrap_or(value)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
