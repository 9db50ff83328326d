//! Subdomain normalization and availability probing.

use tome_core::TomeResult;
use tome_core::repository::TeamRepository;

/// Names the routing layer claims for itself. A reserved candidate is
/// treated exactly like a taken one.
const RESERVED_SUBDOMAINS: &[&str] = &[
    "admin", "api", "app", "assets", "docs", "mail", "static", "status", "www",
];

pub fn is_reserved(candidate: &str) -> bool {
    RESERVED_SUBDOMAINS.contains(&candidate)
}

/// Fold a raw candidate into URL-safe form: lowercase, `[a-z0-9-]` only,
/// no leading or trailing hyphen. May return an empty string when the
/// input carries nothing usable; callers validate.
pub fn normalize_subdomain(raw: &str) -> String {
    let folded: String = raw
        .trim()
        .chars()
        .filter_map(|c| match c {
            'a'..='z' | '0'..='9' | '-' => Some(c),
            'A'..='Z' => Some(c.to_ascii_lowercase()),
            _ => None,
        })
        .collect();
    folded.trim_matches('-').to_string()
}

/// Return `desired` if no team uses it and it is not reserved, otherwise
/// probe `desired1`, `desired2`, ... in ascending order and return the
/// first free value.
///
/// Pure read — no upper bound is imposed, and the caller still owns the
/// race between this check and its create (the storage layer's unique
/// index is the authoritative guard).
pub async fn resolve_available_subdomain<T: TeamRepository>(
    teams: &T,
    desired: &str,
) -> TomeResult<String> {
    let mut suffix: u64 = 0;
    loop {
        let candidate = if suffix == 0 {
            desired.to_string()
        } else {
            format!("{desired}{suffix}")
        };
        if !is_reserved(&candidate) && teams.find_by_subdomain(&candidate).await?.is_none() {
            return Ok(candidate);
        }
        suffix += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalization_folds_case_and_strips_noise() {
        assert_eq!(normalize_subdomain("Acme"), "acme");
        assert_eq!(normalize_subdomain("My Team!"), "myteam");
        assert_eq!(normalize_subdomain("  spaced out  "), "spacedout");
        assert_eq!(normalize_subdomain("-edge-case-"), "edge-case");
        assert_eq!(normalize_subdomain("mixed-1_2"), "mixed-12");
    }

    #[test]
    fn normalization_can_produce_empty() {
        assert_eq!(normalize_subdomain("!!!"), "");
        assert_eq!(normalize_subdomain("---"), "");
    }

    #[test]
    fn reserved_names() {
        assert!(is_reserved("www"));
        assert!(is_reserved("api"));
        assert!(!is_reserved("wiki"));
        // Suffixed variants are ordinary candidates.
        assert!(!is_reserved("www1"));
    }
}
