/// Derive a URL slug from a display name. Re-applied on every create and
/// update so the slug always tracks the current name.
pub fn slugify(name: &str) -> String {
    name.to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '-' })
        .collect::<String>()
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

#[cfg(test)]
mod tests {
    use super::slugify;

    #[test]
    fn lowercases_and_joins_with_dashes() {
        assert_eq!(slugify("Brake Pads Front"), "brake-pads-front");
    }

    #[test]
    fn collapses_runs_of_separators() {
        assert_eq!(slugify("Oil  /  Filter -- 5W30"), "oil-filter-5w30");
        assert_eq!(slugify("  padded  "), "padded");
    }

    #[test]
    fn is_stable_for_already_slugged_input() {
        assert_eq!(slugify("skoda-octavia"), "skoda-octavia");
    }
}
