pub const MAX_PLAYER_NAME_LENGTH: usize = 20;

/// Collapses runs of whitespace and caps the length. Blank names yield `None`.
pub fn sanitize_player_name(name: &str) -> Option<String> {
    let cleaned = name.split_whitespace().collect::<Vec<_>>().join(" ");
    if cleaned.is_empty() {
        return None;
    }
    Some(cleaned.chars().take(MAX_PLAYER_NAME_LENGTH).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapses_whitespace() {
        assert_eq!(sanitize_player_name("  Ada \t Lovelace "), Some("Ada Lovelace".to_string()));
    }

    #[test]
    fn blank_is_rejected() {
        assert_eq!(sanitize_player_name(""), None);
        assert_eq!(sanitize_player_name(" \n "), None);
    }

    #[test]
    fn truncates_on_char_boundary() {
        let long = "é".repeat(30);
        let cleaned = sanitize_player_name(&long).expect("name");
        assert_eq!(cleaned.chars().count(), MAX_PLAYER_NAME_LENGTH);
    }
}
