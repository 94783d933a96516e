// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! A macro to declare typed flag sets over an integer mask.
//!
//! Render states, swapchain usages and composition layer flags are all plain
//! integer masks on the wire. The macro gives each of them its own type so a
//! layer flag can never be OR-ed into a render state by accident.

/// Declares a flag set type backed by an integer.
///
/// The generated type is `Copy`, hashable, serializable as its raw bits and
/// prints the names of the flags it contains.
#[macro_export]
#[doc(hidden)]
macro_rules! xrscene_bitflags {
    (
        $(#[$attr:meta])*
        $vis:vis struct $name:ident: $ty:ty {
            $(
                $(#[$flag_attr:meta])*
                const $flag_name:ident = $flag_value:expr;
            )*
        }
    ) => {
        $(#[$attr])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
        #[derive(serde::Serialize, serde::Deserialize)]
        #[serde(transparent)]
        $vis struct $name($ty);

        impl $name {
            /// The set with no flag.
            pub const EMPTY: Self = Self(0);

            $(
                $(#[$flag_attr])*
                pub const $flag_name: Self = Self($flag_value);
            )*

            /// Wraps raw bits, keeping bits that match no named flag.
            pub const fn from_bits(bits: $ty) -> Self {
                Self(bits)
            }

            /// The raw mask.
            pub const fn bits(self) -> $ty {
                self.0
            }

            /// `true` when no bit is set.
            pub const fn is_empty(self) -> bool {
                self.0 == 0
            }

            /// `true` when every bit of `other` is set in `self`.
            pub const fn contains(self, other: Self) -> bool {
                self.0 & other.0 == other.0
            }

            /// `true` when `self` and `other` share at least one bit.
            pub const fn intersects(self, other: Self) -> bool {
                self.0 & other.0 != 0
            }

            /// Const-friendly union, usable in table initializers.
            #[must_use]
            pub const fn union(self, other: Self) -> Self {
                Self(self.0 | other.0)
            }

            /// Const-friendly difference.
            #[must_use]
            pub const fn difference(self, other: Self) -> Self {
                Self(self.0 & !other.0)
            }

            /// Sets or clears `other` depending on `value`.
            pub fn set(&mut self, other: Self, value: bool) {
                if value {
                    self.0 |= other.0;
                } else {
                    self.0 &= !other.0;
                }
            }

            /// Every named flag with its name, in declaration order.
            pub const NAMED: &'static [(&'static str, Self)] = &[
                $((stringify!($flag_name), Self($flag_value)),)*
            ];
        }

        impl core::ops::BitOr for $name {
            type Output = Self;
            fn bitor(self, other: Self) -> Self {
                self.union(other)
            }
        }

        impl core::ops::BitOrAssign for $name {
            fn bitor_assign(&mut self, other: Self) {
                self.0 |= other.0;
            }
        }

        impl core::ops::BitAnd for $name {
            type Output = Self;
            fn bitand(self, other: Self) -> Self {
                Self(self.0 & other.0)
            }
        }

        impl core::ops::Sub for $name {
            type Output = Self;
            fn sub(self, other: Self) -> Self {
                self.difference(other)
            }
        }

        impl core::fmt::Debug for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                let mut remaining = self.0;
                let mut parts = f.debug_set();
                for (name, flag) in Self::NAMED {
                    // Zero-valued and composite flags are skipped once their bits are consumed.
                    if flag.0 != 0 && remaining & flag.0 == flag.0 {
                        parts.entry(&format_args!("{name}"));
                        remaining &= !flag.0;
                    }
                }
                if remaining != 0 {
                    parts.entry(&format_args!("{remaining:#x}"));
                }
                parts.finish()
            }
        }
    };
}
