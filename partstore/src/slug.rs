/// Derive a URL-safe slug from a display name.
///
/// The name is lowercased, every run of characters outside `[a-z0-9]` becomes a
/// single hyphen, and hyphens at either edge are dropped. The result only ever
/// contains lowercase ASCII letters, digits and single hyphens, so applying the
/// function to its own output returns the same string.
///
/// ```
/// assert_eq!(partstore::slug::slugify("Model Y - 10 - BODY"), "model-y-10-body");
/// ```
#[must_use]
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_hyphen = false;

    for ch in name.chars().flat_map(char::to_lowercase) {
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(ch);
        } else {
            pending_hyphen = true;
        }
    }

    slug
}

#[cfg(test)]
mod tests {
    use super::slugify;

    #[test]
    fn test_basic_names() {
        assert_eq!(slugify("Brake Pad"), "brake-pad");
        assert_eq!(slugify("10 - BODY"), "10-body");
        assert_eq!(slugify("  Floor Mats (All-Weather)  "), "floor-mats-all-weather");
    }

    #[test]
    fn test_edges_and_runs_collapse() {
        assert_eq!(slugify("--Hello___World--"), "hello-world");
        assert_eq!(slugify("!!!"), "");
        assert_eq!(slugify(""), "");
    }

    #[test]
    fn test_non_ascii_is_treated_as_separator() {
        assert_eq!(slugify("Café Racer"), "caf-racer");
        assert_eq!(slugify("Größe"), "gr-e");
    }

    #[test]
    fn test_idempotent_and_charset() {
        let names = [
            "Model Y - 10 - BODY",
            "Charging / Adapters",
            "UPPER lower 123",
            "--a--b--",
            "ûñíçødé ∆ symbols",
            "Tail-light   Assembly, LH",
        ];
        for name in names {
            let once = slugify(name);
            assert_eq!(slugify(&once), once, "slugify is not idempotent for {name:?}");
            assert!(
                once.chars()
                    .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
            );
            assert!(!once.starts_with('-') && !once.ends_with('-'));
            assert!(!once.contains("--"));
        }
    }
}
