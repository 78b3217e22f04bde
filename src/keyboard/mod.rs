//! Inline keyboards and their callback tokens.
//!
//! Tokens are ASCII, `#`-separated, purpose first:
//!
//! - `config#<groupId>#<flagName>`
//! - `access#<groupId>#<adminId>`
//!
//! Handlers decode a token once into [`CallbackPayload`] and never look at
//! the raw string again.

use std::fmt;

use crate::database::{AccessGrant, ConfigFlag, GroupConfig};
use crate::error::{GuardError, GuardResult};
use crate::permissions::AdminEntry;

const SEPARATOR: char = '#';

/// One selectable button: caption plus opaque token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Control {
    pub label: String,
    pub token: String,
}

/// Decoded callback token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackPayload {
    /// Flip `flag_name` on `group_id`. The name is validated by the registry.
    Config { group_id: i64, flag_name: String },
    /// Toggle `admin_id`'s configuration grant. Menus rendered before grants
    /// existed carry no admin.
    Access { group_id: i64, admin_id: Option<u64> },
}

impl CallbackPayload {
    pub fn purpose(&self) -> &'static str {
        match self {
            Self::Config { .. } => "config",
            Self::Access { .. } => "access",
        }
    }
}

impl fmt::Display for CallbackPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config { group_id, flag_name } => {
                write!(f, "config{SEPARATOR}{group_id}{SEPARATOR}{flag_name}")
            }
            Self::Access { group_id, admin_id: Some(admin) } => {
                write!(f, "access{SEPARATOR}{group_id}{SEPARATOR}{admin}")
            }
            Self::Access { group_id, admin_id: None } => write!(f, "access{SEPARATOR}{group_id}"),
        }
    }
}

/// Decode a callback token.
pub fn decode(token: &str) -> GuardResult<CallbackPayload> {
    let malformed = || GuardError::MalformedCallback(token.to_string());

    let (purpose, payload) = token.split_once(SEPARATOR).ok_or_else(malformed)?;
    match purpose {
        "config" => {
            let (group, flag_name) = payload.split_once(SEPARATOR).ok_or_else(malformed)?;
            if flag_name.is_empty() {
                return Err(malformed());
            }
            Ok(CallbackPayload::Config {
                group_id: group.parse().map_err(|_| malformed())?,
                flag_name: flag_name.to_string(),
            })
        }
        "access" => {
            let (group, admin) = match payload.split_once(SEPARATOR) {
                Some((group, admin)) => (group, Some(admin)),
                None => (payload, None),
            };
            Ok(CallbackPayload::Access {
                group_id: group.parse().map_err(|_| malformed())?,
                admin_id: admin.map(|a| a.parse().map_err(|_| malformed())).transpose()?,
            })
        }
        _ => Err(malformed()),
    }
}

fn switcher(on: bool) -> &'static str {
    if on { "✔️" } else { "❌" }
}

/// One control per flag, always in [`ConfigFlag::ALL`] order.
pub fn render_config(config: &GroupConfig) -> Vec<Control> {
    ConfigFlag::ALL
        .into_iter()
        .map(|flag| Control {
            label: format!("{} {}", switcher(config.flag(flag)), flag.description()),
            token: CallbackPayload::Config {
                group_id: config.group_id,
                flag_name: flag.as_str().to_string(),
            }
            .to_string(),
        })
        .collect()
}

/// One control per non-owner admin, marked with their current grant.
pub fn render_access(group_id: i64, admins: &[AdminEntry], grant: Option<&AccessGrant>) -> Vec<Control> {
    admins
        .iter()
        .map(|admin| {
            let granted = grant.is_some_and(|g| g.contains(admin.user_id.0 as i64));
            Control {
                label: format!("{} {}", switcher(granted), admin.full_name()),
                token: CallbackPayload::Access {
                    group_id,
                    admin_id: Some(admin.user_id.0),
                }
                .to_string(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::admin;

    #[test]
    fn test_decode_config_token() {
        assert_eq!(
            decode("config#123#urlMsg").unwrap(),
            CallbackPayload::Config {
                group_id: 123,
                flag_name: "urlMsg".into()
            }
        );
        assert_eq!(
            decode("config#-1001234567890#helloMsg").unwrap(),
            CallbackPayload::Config {
                group_id: -1001234567890,
                flag_name: "helloMsg".into()
            }
        );
    }

    #[test]
    fn test_decode_keeps_unknown_flag_for_registry() {
        let payload = decode("config#123#notAFlag").unwrap();
        assert!(matches!(payload, CallbackPayload::Config { flag_name, .. } if flag_name == "notAFlag"));
    }

    #[test]
    fn test_decode_access_token() {
        assert_eq!(
            decode("access#-5#77").unwrap(),
            CallbackPayload::Access {
                group_id: -5,
                admin_id: Some(77)
            }
        );
        assert_eq!(
            decode("access#-5").unwrap(),
            CallbackPayload::Access {
                group_id: -5,
                admin_id: None
            }
        );
    }

    #[test]
    fn test_decode_rejects_malformed() {
        for token in [
            "garbage",
            "",
            "#",
            "config#",
            "config#123",
            "config#123#",
            "config#abc#urlMsg",
            "access#",
            "access#x",
            "access#1#bob",
            "warn#1#2",
        ] {
            assert!(
                matches!(decode(token), Err(GuardError::MalformedCallback(_))),
                "{token:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_render_config_order_and_markers() {
        let mut config = GroupConfig::new(-42);
        config.url_msg = true;

        let controls = render_config(&config);
        assert_eq!(controls.len(), ConfigFlag::ALL.len());
        for (control, flag) in controls.iter().zip(ConfigFlag::ALL) {
            assert_eq!(control.token, format!("config#-42#{}", flag.as_str()));
            assert!(control.label.ends_with(flag.description()));
            let marker = if flag == ConfigFlag::UrlMsg { "✔️" } else { "❌" };
            assert!(control.label.starts_with(marker), "{}", control.label);
        }
    }

    #[test]
    fn test_rendered_tokens_decode() {
        let config = GroupConfig::new(-42);
        for control in render_config(&config) {
            let payload = decode(&control.token).unwrap();
            assert_eq!(payload.purpose(), "config");
            assert_eq!(payload.to_string(), control.token);
        }
    }

    #[test]
    fn test_render_access_marks_grants() {
        let admins = vec![admin(5), admin(6)];
        let grant = AccessGrant {
            group_id: -1,
            admins: vec![6],
        };

        let controls = render_access(-1, &admins, Some(&grant));
        assert_eq!(controls[0].token, "access#-1#5");
        assert!(controls[0].label.starts_with("❌"));
        assert!(controls[1].label.starts_with("✔️"));

        let none = render_access(-1, &admins, None);
        assert!(none.iter().all(|c| c.label.starts_with("❌")));
    }
}
