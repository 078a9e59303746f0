//! Item geometry: raw dimensions, orientation flags and the plane an item lies in.

use std::fmt;
use std::ops::BitOr;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Integer extents along the x, y and z axes.
pub type Extent3 = (i64, i64, i64);

/// Orientation flags of an item.
///
/// `VERTICAL` and `UP` are the cleared states of the two flags, so they combine
/// freely with `HORIZONTAL` and `DOWN`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ItemOrientation {
    /// Length and width are swapped.
    pub horizontal: bool,
    /// The item faces downwards; its thickness becomes negative.
    pub down: bool,
}

impl ItemOrientation {
    pub const VERTICAL: Self = Self {
        horizontal: false,
        down: false,
    };
    pub const HORIZONTAL: Self = Self {
        horizontal: true,
        down: false,
    };
    pub const UP: Self = Self::VERTICAL;
    pub const DOWN: Self = Self {
        horizontal: false,
        down: true,
    };

    pub fn to_bits(self) -> u8 {
        let mut bits = 0;
        if self.horizontal {
            bits |= 1;
        }
        if self.down {
            bits |= 1 << 1;
        }
        bits
    }

    pub fn from_bits(v: u8) -> Self {
        Self {
            horizontal: (v & 1) != 0,
            down: (v & (1 << 1)) != 0,
        }
    }
}

impl BitOr for ItemOrientation {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self::from_bits(self.to_bits() | rhs.to_bits())
    }
}

impl fmt::Display for ItemOrientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let facing = if self.horizontal {
            "HORIZONTAL"
        } else {
            "VERTICAL"
        };
        if self.down {
            write!(f, "{facing}|DOWN")
        } else {
            f.write_str(facing)
        }
    }
}

impl FromStr for ItemOrientation {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.split('|')
            .map(str::trim)
            .try_fold(Self::VERTICAL, |acc, flag| {
                let flag = match flag.to_ascii_uppercase().as_str() {
                    "VERTICAL" | "UP" => Self::VERTICAL,
                    "HORIZONTAL" => Self::HORIZONTAL,
                    "DOWN" => Self::DOWN,
                    _ => return Err(ConfigError::UnknownOrientation(flag.to_string())),
                };
                Ok(acc | flag)
            })
    }
}

impl TryFrom<String> for ItemOrientation {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ItemOrientation> for String {
    fn from(value: ItemOrientation) -> Self {
        value.to_string()
    }
}

/// Axis plane an item lies in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Plane {
    XY,
    /// Standing upright along the box's length.
    #[default]
    XZ,
    YZ,
}

impl fmt::Display for Plane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Plane::XY => "XY",
            Plane::XZ => "XZ",
            Plane::YZ => "YZ",
        })
    }
}

impl FromStr for Plane {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "XY" => Ok(Plane::XY),
            "XZ" => Ok(Plane::XZ),
            "YZ" => Ok(Plane::YZ),
            _ => Err(ConfigError::UnknownPlane(s.to_string())),
        }
    }
}

impl TryFrom<String> for Plane {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Plane> for String {
    fn from(value: Plane) -> Self {
        value.to_string()
    }
}

/// Axis along which the items of one class are stacked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum StackingDirection {
    X,
    Y,
    Z,
    /// Stack along the axis with the smallest extent.
    #[default]
    Minimal,
}

impl fmt::Display for StackingDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StackingDirection::X => "X",
            StackingDirection::Y => "Y",
            StackingDirection::Z => "Z",
            StackingDirection::Minimal => "MINIMAL",
        })
    }
}

impl FromStr for StackingDirection {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "X" => Ok(StackingDirection::X),
            "Y" => Ok(StackingDirection::Y),
            "Z" => Ok(StackingDirection::Z),
            "MINIMAL" => Ok(StackingDirection::Minimal),
            _ => Err(ConfigError::UnknownStackingDirection(s.to_string())),
        }
    }
}

impl TryFrom<String> for StackingDirection {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<StackingDirection> for String {
    fn from(value: StackingDirection) -> Self {
        value.to_string()
    }
}

/// A physical item: card, tile or generic box.
///
/// Items are plain values. Two items with the same dimensions, orientation and
/// plane are the same item, which is what the box catalog keys on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Item {
    pub length: i64,
    pub width: i64,
    /// Thickness.
    pub height: i64,
    #[serde(default)]
    pub orientation: ItemOrientation,
    #[serde(default)]
    pub plane: Plane,
}

impl Item {
    /// Create an upright item in the default plane.
    pub fn new(length: i64, width: i64, height: i64) -> Self {
        Self {
            length,
            width,
            height,
            orientation: ItemOrientation::default(),
            plane: Plane::default(),
        }
    }

    pub fn with_orientation(mut self, orientation: ItemOrientation) -> Self {
        self.orientation = orientation;
        self
    }

    pub fn with_plane(mut self, plane: Plane) -> Self {
        self.plane = plane;
        self
    }

    /// Same orientation and plane, new raw dimensions.
    pub fn with_dims(mut self, length: i64, width: i64, height: i64) -> Self {
        self.length = length;
        self.width = width;
        self.height = height;
        self
    }

    /// Oriented bounding box of the item.
    ///
    /// The z extent is negative for downward-facing items.
    pub fn bounding_box(&self) -> Extent3 {
        let (mut x, mut y, mut z) = (self.width, self.length, self.height);
        if self.orientation.down {
            z = -z;
        }
        if self.orientation.horizontal {
            (x, y) = (y, x);
        }
        match self.plane {
            Plane::XY => (x, y, z),
            Plane::XZ => (x, z, y),
            Plane::YZ => (z, x, y),
        }
    }

    /// Signed volume of the bounding box.
    pub fn volume(&self) -> i64 {
        let (x, y, z) = self.bounding_box();
        x * y * z
    }
}
