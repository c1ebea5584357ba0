//! Caller-facing reply text.
//!
//! The engine reports stable reason codes; this module renders them into
//! the messages the chat adapter sends back to the caller.

use call_core::{Exclusion, ExclusionReason, RoleId};

/// Reply sent when a call begins.
pub const STARTING_CALL: &str = "Starting to call.";

/// Reply sent when a call ends.
pub const FINISHING_CALL: &str = "Finishing to call.";

/// Reply when the caller is not in a voice channel.
pub const CALLER_NOT_IN_VOICE: &str =
    "You have to be connected to a voice channel to use this command.";

/// Reply when calling everyone is disabled.
pub const EVERYONE_NOT_CALLABLE: &str = "Calling everyone is not allowed in this server.";

/// Reply when a command was given no mentions.
pub const NO_MENTIONS: &str = "no user/role was provided. use the `/help` command of this bot \
     for more information about how to use it.";

/// Text of the direct notification sent to a target.
pub fn notification_text(caller_name: &str, invite_url: &str) -> String {
    format!("`{}` is calling you on {}", caller_name, invite_url)
}

/// One line of the "didn't call" report.
pub fn exclusion_line(exclusion: &Exclusion) -> String {
    let because = match exclusion.reason {
        ExclusionReason::Status(presence) => format!("their status is `{}`. ❌", presence),
        ExclusionReason::AlreadyConnected => "they are already connected. ✅".to_string(),
        ExclusionReason::UncallableRole => "they have an uncallable role. 📵".to_string(),
        ExclusionReason::DeliveryBlocked => "they blocked this bot. 🚫".to_string(),
    };
    format!("\t{} because {}", exclusion.user_id.mention(), because)
}

/// The "didn't call" report, or `None` when every target was called.
pub fn didnt_call_message(unreachable: &[Exclusion]) -> Option<String> {
    if unreachable.is_empty() {
        return None;
    }

    let mut message = String::from("Didn't call: ");
    for exclusion in unreachable {
        message.push('\n');
        message.push_str(&exclusion_line(exclusion));
    }
    Some(message)
}

/// Listing of a guild's uncallable roles.
pub fn uncallables_message(roles: &[RoleId]) -> String {
    match roles {
        [] => "There are no uncallable roles in this server.".to_string(),
        [role] => format!("The uncallable role in this server is {}.", role.mention()),
        _ => {
            let mentions: Vec<String> = roles.iter().map(|role| role.mention()).collect();
            format!(
                "The uncallable roles in this server are: {}.",
                mentions.join(", ")
            )
        }
    }
}

/// Reply to marking a role uncallable.
pub fn role_marked_message(role_name: &str, added: bool) -> String {
    if added {
        format!("The role `{}` is now not callable", role_name)
    } else {
        format!("The role `{}` is already not callable", role_name)
    }
}

/// Reply to making a role callable again.
pub fn role_recalled_message(role_name: &str, removed: bool) -> String {
    if removed {
        format!("The role `{}` is now callable.", role_name)
    } else {
        format!("The role `{}` is already callable.", role_name)
    }
}

/// Reply to changing the everyone toggle.
pub fn everyone_toggled_message(callable: bool, changed: bool) -> String {
    let state = if changed { "now" } else { "already" };
    if callable {
        format!("Everyone is {} callable.", state)
    } else {
        format!("Everyone is {} not callable.", state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use call_core::{Presence, UserId};

    #[test]
    fn test_notification_text() {
        assert_eq!(
            notification_text("alice", "https://discord.gg/abc"),
            "`alice` is calling you on https://discord.gg/abc"
        );
    }

    #[test]
    fn test_didnt_call_message() {
        assert_eq!(didnt_call_message(&[]), None);

        let message = didnt_call_message(&[
            Exclusion::new(UserId(3), ExclusionReason::UncallableRole),
            Exclusion::new(UserId(4), ExclusionReason::Status(Presence::Offline)),
        ])
        .unwrap();
        assert_eq!(
            message,
            "Didn't call: \n\t<@3> because they have an uncallable role. 📵\
             \n\t<@4> because their status is `offline`. ❌"
        );
    }

    #[test]
    fn test_uncallables_phrasing() {
        assert_eq!(
            uncallables_message(&[]),
            "There are no uncallable roles in this server."
        );
        assert_eq!(
            uncallables_message(&[RoleId(1)]),
            "The uncallable role in this server is <@&1>."
        );
        assert_eq!(
            uncallables_message(&[RoleId(1), RoleId(2)]),
            "The uncallable roles in this server are: <@&1>, <@&2>."
        );
    }

    #[test]
    fn test_role_messages() {
        assert_eq!(
            role_marked_message("mods", true),
            "The role `mods` is now not callable"
        );
        assert_eq!(
            role_recalled_message("mods", false),
            "The role `mods` is already callable."
        );
        assert_eq!(everyone_toggled_message(true, false), "Everyone is already callable.");
        assert_eq!(everyone_toggled_message(false, true), "Everyone is now not callable.");
    }
}
