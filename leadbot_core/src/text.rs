//! Inbound text normalization shared by every transport.

/// Keyword that restarts the intake flow from any state.
pub const MENU_COMMAND: &str = "menu";

/// Trim surrounding whitespace and lowercase.
///
/// Applied once per inbound message so that `"Menu"`, `" menu "` and
/// `"MENU"` compare equal and purpose codes compare as plain characters.
#[must_use]
pub fn normalize_text(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// `true` when already-normalized `text` is the restart keyword.
#[must_use]
pub fn is_menu_command(text: &str) -> bool {
    text == MENU_COMMAND
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_trims_and_lowercases() {
        assert_eq!(normalize_text("  Menu \n"), "menu");
        assert_eq!(normalize_text("MENU"), "menu");
        assert_eq!(normalize_text("\t2 "), "2");
    }

    #[test]
    fn test_normalize_keeps_inner_whitespace() {
        assert_eq!(
            normalize_text(" Terça 10h, Revisão de contrato "),
            "terça 10h, revisão de contrato"
        );
    }

    #[test]
    fn test_normalize_whitespace_only_is_empty() {
        assert!(normalize_text("   \n\t").is_empty());
    }

    #[test]
    fn test_menu_command_matches_only_normalized_keyword() {
        assert!(is_menu_command(&normalize_text(" MeNu ")));
        assert!(!is_menu_command("menu please"));
        assert!(!is_menu_command("Menu"));
    }
}
