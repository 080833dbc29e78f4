/// Display colours for the languages GitHub reports most often, using the
/// linguist palette.
const LANGUAGE_COLORS: &[(&str, &str)] = &[
    ("C", "#555555"),
    ("C#", "#178600"),
    ("C++", "#f34b7d"),
    ("CSS", "#563d7c"),
    ("Dart", "#00B4AB"),
    ("Go", "#00ADD8"),
    ("HTML", "#e34c26"),
    ("Java", "#b07219"),
    ("JavaScript", "#f1e05a"),
    ("Kotlin", "#A97BFF"),
    ("Markdown", "#083fa1"),
    ("PHP", "#4F5D95"),
    ("Python", "#3572A5"),
    ("Ruby", "#701516"),
    ("Rust", "#dea584"),
    ("Shell", "#89e051"),
    ("Swift", "#F05138"),
    ("TypeScript", "#3178c6"),
    ("Vue", "#41b883"),
];

/// Colour for `language`, `None` for languages outside the table.
pub fn language_color(language: &str) -> Option<&'static str> {
    LANGUAGE_COLORS
        .iter()
        .find(|(name, _)| *name == language)
        .map(|(_, color)| *color)
}

/// Parses a `#rrggbb` colour into its components.
pub fn parse_hex(color: &str) -> Option<(u8, u8, u8)> {
    let hex = color.strip_prefix('#')?;
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |range| u8::from_str_radix(&hex[range], 16).ok();
    Some((channel(0..2)?, channel(2..4)?, channel(4..6)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_and_unknown_languages() {
        assert_eq!(language_color("Rust"), Some("#dea584"));
        assert_eq!(language_color("TypeScript"), Some("#3178c6"));
        assert_eq!(language_color("Brainfuck"), None);
        assert_eq!(language_color("rust"), None);
    }

    #[test]
    fn test_parse_hex() {
        assert_eq!(parse_hex("#dea584"), Some((0xde, 0xa5, 0x84)));
        assert_eq!(parse_hex("dea584"), None);
        assert_eq!(parse_hex("#fff"), None);
        assert_eq!(parse_hex("#zzzzzz"), None);
    }
}
