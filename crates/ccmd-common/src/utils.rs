//! Shared utility functions.

use chrono::{DateTime, Utc};

/// Longest name Discord accepts for a chat input command.
pub const MAX_COMMAND_NAME_LENGTH: usize = 32;

/// Longest description Discord accepts for a chat input command.
pub const MAX_COMMAND_DESCRIPTION_LENGTH: usize = 100;

/// Formats a timestamp for display.
pub fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

/// Parses a `#RRGGBB` (or bare `RRGGBB`) colour into its packed RGB value.
pub fn parse_hex_color(input: &str) -> Option<u32> {
    let trimmed = input.trim();
    let hex = trimmed.strip_prefix('#').unwrap_or(trimmed);
    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    u32::from_str_radix(hex, 16).ok()
}

/// Checks a chat input command name against Discord's naming rules.
///
/// Names are 1 to 32 characters of lowercase letters, digits, `-` or `_`.
pub fn is_valid_command_name(name: &str) -> bool {
    let length = name.chars().count();
    (1..=MAX_COMMAND_NAME_LENGTH).contains(&length)
        && name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_')
}
