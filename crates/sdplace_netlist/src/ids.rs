//! Opaque ID newtypes for netlist entities.
//!
//! [`CellId`], [`NetId`], and [`PinId`] are thin `u32` wrappers used as arena
//! indices into the [`Netlist`](crate::Netlist). They are `Copy`, `Ord`,
//! `Hash`, and `Serialize`/`Deserialize`.

use serde::{Deserialize, Serialize};

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(u32);

        impl $name {
            /// Creates an ID from a raw `u32` index.
            pub fn from_raw(index: u32) -> Self {
                Self(index)
            }

            /// Returns the raw `u32` index.
            pub fn as_raw(self) -> u32 {
                self.0
            }

            pub(crate) fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

define_id!(
    /// Opaque, copyable ID for a cell in the netlist.
    CellId
);

define_id!(
    /// Opaque, copyable ID for a net in the netlist.
    NetId
);

define_id!(
    /// Opaque, copyable ID for a cell port (pin) in the netlist.
    PinId
);
