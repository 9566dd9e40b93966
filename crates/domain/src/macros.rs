//! Macro for implementing Display and FromStr for configuration choice enums
//!
//! Configuration options such as `auth_type` or `env` only accept a fixed set
//! of values. This macro generates both conversions from a single mapping and
//! produces the "Permissible values" message used by configuration
//! validation when parsing fails.
//!
//! # Example
//!
//! ```rust
//! use lapi_domain::impl_choice_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum Channel {
//!     Stable,
//!     Beta,
//! }
//!
//! impl_choice_conversions!(Channel {
//!     Stable => "stable",
//!     Beta => "beta",
//! });
//!
//! assert_eq!(Channel::Beta.to_string(), "beta");
//! assert_eq!(
//!     "nightly".parse::<Channel>().unwrap_err(),
//!     "Permissible values: \"stable\", \"beta\""
//! );
//! ```

/// Implements Display, FromStr and a `PERMISSIBLE_VALUES` list for choice
/// enums.
///
/// Parsing is case-insensitive; display always uses the mapped lowercase
/// string.
#[macro_export]
macro_rules! impl_choice_conversions {
    ($enum_name:ident { $($variant:ident => $str:literal),+ $(,)? }) => {
        impl $enum_name {
            /// Every accepted string representation, in declaration order.
            pub const PERMISSIBLE_VALUES: &'static [&'static str] = &[$($str),+];

            /// String representation used on the wire and in configuration.
            #[must_use]
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $str,)+
                }
            }
        }

        impl ::std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl ::std::str::FromStr for $enum_name {
            type Err = String;

            fn from_str(s: &str) -> ::core::result::Result<Self, Self::Err> {
                match s.to_lowercase().as_str() {
                    $($str => ::core::result::Result::Ok(Self::$variant),)+
                    _ => ::core::result::Result::Err(::std::format!(
                        "Permissible values: {}",
                        Self::PERMISSIBLE_VALUES
                            .iter()
                            .map(|value| ::std::format!("\"{value}\""))
                            .collect::<::std::vec::Vec<_>>()
                            .join(", ")
                    )),
                }
            }
        }
    };
}
