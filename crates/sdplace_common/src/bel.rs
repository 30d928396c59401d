//! Physical BEL coordinates with host attribute parsing and display.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A physical placement coordinate `(x, y, z)`.
///
/// `x`/`y` address a tile of the device grid and `z` a slot inside it. The
/// host tool stores BELs as attribute strings of the form `X<x>/Y<y>/lc<z>`
/// (or `X<x>/Y<y>/io<z>` for IO tiles); [`FromStr`] accepts any of these by
/// keeping only the digits and sign of each `/`-separated component.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub struct Bel {
    /// Column of the tile.
    pub x: i32,
    /// Row of the tile.
    pub y: i32,
    /// Slot index inside the tile.
    pub z: i32,
}

impl Bel {
    /// Creates a new coordinate.
    pub fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Returns the tile-level coordinate (same `x`/`y`, `z = 0`).
    pub fn tile(self) -> Self {
        Self { z: 0, ..self }
    }

    /// Returns the tile shifted by `(dx, dy)`, or `None` if a coordinate
    /// overflows.
    pub fn offset(self, dx: i32, dy: i32) -> Option<Self> {
        Some(Self::new(self.x.checked_add(dx)?, self.y.checked_add(dy)?, 0))
    }
}

/// Formats as the logic-cell attribute string `X<x>/Y<y>/lc<z>`.
impl fmt::Display for Bel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "X{}/Y{}/lc{}", self.x, self.y, self.z)
    }
}

/// Error type for parsing BEL attribute strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseBelError {
    /// The input string that failed to parse.
    pub input: String,
}

impl fmt::Display for ParseBelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid BEL: '{}'", self.input)
    }
}

impl std::error::Error for ParseBelError {}

impl FromStr for Bel {
    type Err = ParseBelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseBelError {
            input: s.to_string(),
        };

        let parts: Vec<i32> = s
            .trim()
            .split('/')
            .map(|part| {
                let digits: String = part
                    .chars()
                    .filter(|c| c.is_ascii_digit() || *c == '-')
                    .collect();
                digits.parse::<i32>().map_err(|_| err())
            })
            .collect::<Result<_, _>>()?;

        match parts.as_slice() {
            [x, y, z] => Ok(Bel::new(*x, *y, *z)),
            _ => Err(err()),
        }
    }
}
