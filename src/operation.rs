/*
MIT License
Copyright (c) 2021 Germán Molina
Permission is hereby granted, free of charge, to any person obtaining a copy
of this software and associated documentation files (the "Software"), to deal
in the Software without restriction, including without limitation the rights
to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
copies of the Software, and to permit persons to whom the Software is
furnished to do so, subject to the following conditions:
The above copyright notice and this permission notice shall be included in all
copies or substantial portions of the Software.
THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
SOFTWARE.
*/

use serde::{Deserialize, Serialize};

/// One of the four sides of a grid point. When the point is on
/// the surface of a solid, this is the side that faces the air.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Face {
    /// Facing $`-x`$
    Left,
    /// Facing $`+x`$
    Right,
    /// Facing $`-y`$
    Bottom,
    /// Facing $`+y`$
    Top,
}

/// The update rule of a grid point, which depends on where in the
/// solid it is.
///
/// The numeric codes (see [`Operation::code`]) are the ones used by
/// operation masks stored as plain integers.
///
/// | Code | Operation     |
/// |------|---------------|
/// | 0    | Air (no-op)   |
/// | 1    | Interior      |
/// | 2-5  | Left, Right, Bottom and Top edges |
/// | 6-9  | Bottom-left, Bottom-right, Top-left and Top-right corners |
/// | 10   | Material interface along $`y`$ |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Operation {
    /// Not part of any solid, so it is never updated
    #[default]
    Air,
    Interior,
    LeftEdge,
    RightEdge,
    BottomEdge,
    TopEdge,
    BottomLeftCorner,
    BottomRightCorner,
    TopLeftCorner,
    TopRightCorner,
    /// A point where two materials of different conductivity meet,
    /// one below and one above
    Interface,
}

impl Operation {
    /// All the operations, sorted by code
    pub const ALL: [Operation; 11] = [
        Operation::Air,
        Operation::Interior,
        Operation::LeftEdge,
        Operation::RightEdge,
        Operation::BottomEdge,
        Operation::TopEdge,
        Operation::BottomLeftCorner,
        Operation::BottomRightCorner,
        Operation::TopLeftCorner,
        Operation::TopRightCorner,
        Operation::Interface,
    ];

    /// The integer code of the operation
    pub fn code(self) -> u8 {
        match self {
            Self::Air => 0,
            Self::Interior => 1,
            Self::LeftEdge => 2,
            Self::RightEdge => 3,
            Self::BottomEdge => 4,
            Self::TopEdge => 5,
            Self::BottomLeftCorner => 6,
            Self::BottomRightCorner => 7,
            Self::TopLeftCorner => 8,
            Self::TopRightCorner => 9,
            Self::Interface => 10,
        }
    }

    /// Gets the operation corresponding to an integer code, if any.
    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.get(code as usize).copied()
    }

    /// Is this point part of a solid?
    pub fn is_solid(self) -> bool {
        !matches!(self, Self::Air)
    }

    /// Does this point lose (or gain) heat through a surface?
    pub fn is_boundary(self) -> bool {
        !self.exposed_faces().is_empty()
    }

    /// The faces of the point that are in contact with the air (or
    /// with the limits of the domain)
    pub fn exposed_faces(self) -> &'static [Face] {
        match self {
            Self::Air | Self::Interior | Self::Interface => &[],
            Self::LeftEdge => &[Face::Left],
            Self::RightEdge => &[Face::Right],
            Self::BottomEdge => &[Face::Bottom],
            Self::TopEdge => &[Face::Top],
            Self::BottomLeftCorner => &[Face::Left, Face::Bottom],
            Self::BottomRightCorner => &[Face::Right, Face::Bottom],
            Self::TopLeftCorner => &[Face::Left, Face::Top],
            Self::TopRightCorner => &[Face::Right, Face::Top],
        }
    }

    /// Whether the update rule reads the neighbour on the given side.
    ///
    /// Exposed faces are never read (a ghost point reflected from the
    /// opposite neighbour is used instead), and the interface rule only
    /// reads along $`y`$.
    pub fn reads(self, side: Face) -> bool {
        match self {
            Self::Air => false,
            Self::Interface => matches!(side, Face::Bottom | Face::Top),
            _ => !self.exposed_faces().contains(&side),
        }
    }

    /// Classifies a solid point based on which of its sides are exposed.
    ///
    /// Returns `None` if the point is exposed on two opposite sides, as no
    /// ghost point can be reflected in that case.
    pub fn from_exposure(left: bool, right: bool, bottom: bool, top: bool) -> Option<Self> {
        let op = match (left, right, bottom, top) {
            (false, false, false, false) => Self::Interior,
            (true, false, false, false) => Self::LeftEdge,
            (false, true, false, false) => Self::RightEdge,
            (false, false, true, false) => Self::BottomEdge,
            (false, false, false, true) => Self::TopEdge,
            (true, false, true, false) => Self::BottomLeftCorner,
            (false, true, true, false) => Self::BottomRightCorner,
            (true, false, false, true) => Self::TopLeftCorner,
            (false, true, false, true) => Self::TopRightCorner,
            _ => return None,
        };
        Some(op)
    }
}

/***********/
/* TESTING */
/***********/
