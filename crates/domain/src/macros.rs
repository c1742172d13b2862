//! Macro for implementing Display and FromStr for wire-level enums
//!
//! Operation kinds and compression formats travel as lowercase strings in
//! envelopes, headers and configuration files. This macro provides a single
//! implementation for both Display and FromStr so the two directions can
//! never drift apart.
//!
//! # Example
//!
//! ```rust
//! use ledgerlink_domain::impl_wire_enum_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum Verb {
//!     Get,
//!     Post,
//! }
//!
//! impl_wire_enum_conversions!(Verb {
//!     Get => "get",
//!     Post => "post",
//! });
//!
//! assert_eq!(Verb::Post.to_string(), "post");
//! assert_eq!("GET".parse::<Verb>(), Ok(Verb::Get));
//! ```

/// Implements Display and FromStr traits for wire-level enums
///
/// This macro generates:
/// - Display trait: converts enum variants to their wire strings
/// - FromStr trait: parses case-insensitive strings to enum variants
///
/// # Arguments
///
/// * `$enum_name` - The name of the enum type
/// * `$variant => $str` - Mapping of enum variants to their lowercase wire
///   representations
#[macro_export]
macro_rules! impl_wire_enum_conversions {
    ($enum_name:ident { $($variant:ident => $str:literal),+ $(,)? }) => {
        impl $enum_name {
            /// Wire representation of this variant.
            pub fn as_wire_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $str,)+
                }
            }
        }

        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_wire_str())
            }
        }

        impl std::str::FromStr for $enum_name {
            type Err = String;

            fn from_str(s: &str) -> ::std::result::Result<Self, Self::Err> {
                match s.trim().to_lowercase().as_str() {
                    $($str => Ok(Self::$variant),)+
                    _ => Err(format!("Invalid {}: {}", stringify!($enum_name), s)),
                }
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum TestVerb {
        Create,
        SparseUpdate,
        Delete,
    }

    impl_wire_enum_conversions!(TestVerb {
        Create => "create",
        SparseUpdate => "sparse update",
        Delete => "delete",
    });

    #[test]
    fn test_display_conversion() {
        assert_eq!(TestVerb::Create.to_string(), "create");
        assert_eq!(TestVerb::SparseUpdate.to_string(), "sparse update");
        assert_eq!(TestVerb::Delete.as_wire_str(), "delete");
    }

    #[test]
    fn test_fromstr_mixed_case() {
        assert_eq!(TestVerb::from_str("CREATE").unwrap(), TestVerb::Create);
        assert_eq!(TestVerb::from_str("Sparse Update").unwrap(), TestVerb::SparseUpdate);
        assert_eq!(TestVerb::from_str("  delete ").unwrap(), TestVerb::Delete);
    }

    #[test]
    fn test_fromstr_invalid() {
        let result = TestVerb::from_str("upsert");
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("Invalid TestVerb: upsert"));
    }

    #[test]
    fn test_roundtrip() {
        for verb in [TestVerb::Create, TestVerb::SparseUpdate, TestVerb::Delete] {
            let parsed = TestVerb::from_str(&verb.to_string()).unwrap();
            assert_eq!(verb, parsed);
        }
    }
}
