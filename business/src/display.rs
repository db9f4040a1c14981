//! Presentation helpers shared by every front end.

use crate::{UserRole, UserStatus};

const AVATAR_COLORS: [&str; 5] = ["#FF6B6B", "#4ECDC4", "#45B7D1", "#FFA07A", "#98D8C8"];

pub fn role_label(role: UserRole) -> &'static str {
    match role {
        UserRole::Admin => "Administrator",
        UserRole::Moderator => "Moderator",
        UserRole::User => "User",
    }
}

pub fn status_label(status: UserStatus) -> &'static str {
    match status {
        UserStatus::Active => "Active",
        UserStatus::Inactive => "Inactive",
    }
}

/// Inline SVG data URI: the uppercased initial on a color picked from the first character.
pub fn default_avatar(name: &str) -> String {
    let first = name.chars().next();
    let initial: String = first
        .map(|c| c.to_uppercase().collect())
        .unwrap_or_default();
    let color = first
        .and_then(|c| AVATAR_COLORS.get(c as usize % AVATAR_COLORS.len()))
        .unwrap_or(&AVATAR_COLORS[0])
        .replace('#', "%23");

    format!(
        "data:image/svg+xml,%3Csvg xmlns='http://www.w3.org/2000/svg' width='40' height='40'%3E\
         %3Crect width='40' height='40' fill='{color}'/%3E\
         %3Ctext x='50%25' y='50%25' dominant-baseline='middle' text-anchor='middle' \
         font-family='Arial' font-size='20' fill='white'%3E{initial}%3C/text%3E%3C/svg%3E"
    )
}

/// The stored avatar, or a generated one when it is empty.
pub fn user_avatar(avatar: &str, name: &str) -> String {
    if avatar.is_empty() {
        default_avatar(name)
    } else {
        avatar.to_owned()
    }
}
