//! UUID utilities
//!
//! Measurement identity is either embedded in an export document or derived
//! from the file's data-root-relative path (UUIDv5 in the URL namespace).

use uuid::Uuid;

/// Generate a new UUIDv4
pub fn generate() -> Uuid {
    Uuid::new_v4()
}

/// Parse UUID from string
///
/// Accepts hyphenated, simple, braced and `urn:uuid:` forms. Surrounding
/// whitespace is ignored.
pub fn parse(s: &str) -> Result<Uuid, uuid::Error> {
    Uuid::parse_str(s.trim())
}

/// Deterministic identifier for a data-root-relative path
///
/// Same path, same UUID, on every run and every platform (paths are
/// forward-slash normalized before they get here).
pub fn from_relative_path(relative_path: &str) -> Uuid {
    Uuid::new_v5(&Uuid::NAMESPACE_URL, relative_path.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_identity_is_deterministic() {
        let a = from_relative_path("json/unit/ResonX 1.json");
        let b = from_relative_path("json/unit/ResonX 1.json");
        let c = from_relative_path("json/unit/ResonX 2.json");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.get_version_num(), 5);
    }

    #[test]
    fn test_path_identity_known_value() {
        // Catalogs written by earlier tooling used the same UUIDv5 derivation
        let id = from_relative_path("json/unit/ResonX 1.json");
        assert_eq!(id.to_string(), "7ed1319a-8b46-5305-ab00-145f2b42b887");
    }

    #[test]
    fn test_parse_accepts_common_forms() {
        let hyphenated = "67e55044-10b1-426f-9247-bb680e5fe0c8";
        let expected = parse(hyphenated).unwrap();
        assert_eq!(parse("67e5504410b1426f9247bb680e5fe0c8").unwrap(), expected);
        assert_eq!(parse("{67e55044-10b1-426f-9247-bb680e5fe0c8}").unwrap(), expected);
        assert_eq!(parse("urn:uuid:67e55044-10b1-426f-9247-bb680e5fe0c8").unwrap(), expected);
        assert_eq!(parse("  67e55044-10b1-426f-9247-bb680e5fe0c8 ").unwrap(), expected);
        assert!(parse("not-a-uuid").is_err());
    }
}
