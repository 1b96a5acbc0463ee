// SPDX-FileCopyrightText: 2026 Wahook Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Name resolution for the contact-upsert family.
//!
//! Business-name, contact, picture, history-sync, group-info and push-name
//! events all collapse into a list of [`ContactPlan`]s. The router then looks
//! up pictures and hidden-user ids for each plan and emits one
//! `contacts.upsert` notification per event.

use std::collections::HashMap;

use tracing::error;

use wahook_core::Jid;
use wahook_core::event::{
    BusinessNameEvent, ContactEvent, GroupInfoEvent, HistorySyncEvent, PictureEvent, PushNameEvent,
    RawEvent,
};
use wahook_core::jid::looks_like_chat_id;

/// One identity to emit, before picture and lid lookups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactPlan {
    pub jid: Jid,
    pub name: String,
    /// Also inline the profile picture as base64.
    pub with_base64: bool,
    /// Drop the identity when no profile picture URL is found.
    pub require_picture: bool,
}

impl ContactPlan {
    fn named(jid: &Jid, name: &str) -> Self {
        Self {
            jid: jid.clone(),
            name: name.to_string(),
            with_base64: false,
            require_picture: false,
        }
    }
}

/// First candidate that is not empty.
pub fn first_non_empty<'a>(candidates: impl IntoIterator<Item = &'a str>) -> Option<&'a str> {
    candidates.into_iter().find(|c| !c.is_empty())
}

/// Plans for a contact-family event. Empty when nothing should be emitted.
pub fn plan_contacts(event: &RawEvent) -> Vec<ContactPlan> {
    let plan = match event {
        RawEvent::BusinessName(e) => business_name(e),
        RawEvent::Contact(e) => contact(e),
        RawEvent::Picture(e) => Some(picture(e)),
        RawEvent::GroupInfo(e) => group_info(e),
        RawEvent::PushName(e) => push_name(e),
        RawEvent::HistorySync(e) => return history_identities(e).unwrap_or_default(),
        _ => None,
    };
    plan.into_iter().collect()
}

/// Emitted even when every name source is empty.
fn business_name(e: &BusinessNameEvent) -> Option<ContactPlan> {
    let name = first_non_empty([
        e.new_business_name.as_str(),
        e.old_business_name.as_str(),
        e.message_push_name.as_str(),
        e.verified_name.as_str(),
    ])
    .unwrap_or_default();
    if looks_like_chat_id(name) {
        return None;
    }
    Some(ContactPlan {
        with_base64: true,
        ..ContactPlan::named(&e.jid, name)
    })
}

fn contact(e: &ContactEvent) -> Option<ContactPlan> {
    let name = first_non_empty([e.first_name.as_str(), e.full_name.as_str(), e.username.as_str()])?;
    (!looks_like_chat_id(name)).then(|| ContactPlan::named(&e.jid, name))
}

fn picture(e: &PictureEvent) -> ContactPlan {
    ContactPlan {
        with_base64: true,
        require_picture: true,
        ..ContactPlan::named(&e.jid, "")
    }
}

fn group_info(e: &GroupInfoEvent) -> Option<ContactPlan> {
    let name = e.name.as_deref().filter(|n| !n.is_empty())?;
    (!looks_like_chat_id(name)).then(|| ContactPlan::named(&e.jid, name))
}

fn push_name(e: &PushNameEvent) -> Option<ContactPlan> {
    let name = first_non_empty([e.new_push_name.as_str(), e.old_push_name.as_str()])?;
    (!looks_like_chat_id(name)).then(|| ContactPlan::named(&e.jid, name))
}

/// Identities carried by a history sync batch, deduplicated by jid in first-seen
/// order (later records overwrite the name).
///
/// Returns `None` when any record names itself with a chat id or carries an
/// unparseable id: the whole batch is rejected in that case.
pub fn history_identities(e: &HistorySyncEvent) -> Option<Vec<ContactPlan>> {
    let push_names = e
        .push_names
        .iter()
        .map(|p| (p.id.as_str(), Some(p.push_name.as_str())));
    let conversations = e.conversations.iter().map(|c| {
        (
            c.id.as_str(),
            first_non_empty([c.name.as_str(), c.display_name.as_str(), c.username.as_str()]),
        )
    });

    let mut plans: Vec<ContactPlan> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    for (id, name) in push_names.chain(conversations) {
        let Some(name) = name.filter(|n| !n.is_empty()) else {
            continue;
        };
        if looks_like_chat_id(name) {
            return None;
        }
        let jid: Jid = match id.parse() {
            Ok(jid) => jid,
            Err(err) => {
                error!(id, name, error = %err, "failed to parse history sync jid");
                return None;
            }
        };

        let plan = ContactPlan::named(&jid, name);
        match index.get(&jid.to_string()) {
            Some(&i) => plans[i] = plan,
            None => {
                index.insert(jid.to_string(), plans.len());
                plans.push(plan);
            }
        }
    }
    Some(plans)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wahook_core::event::{HistoryConversation, HistoryPushName};

    fn jid() -> Jid {
        Jid::user("5511")
    }

    #[test]
    fn first_non_empty_skips_blanks() {
        assert_eq!(first_non_empty(["", "b", "c"]), Some("b"));
        assert_eq!(first_non_empty(["", ""]), None);
    }

    #[test]
    fn contact_name_priority() {
        let e = ContactEvent {
            jid: jid(),
            first_name: String::new(),
            full_name: "Ana Maria".into(),
            username: "ana".into(),
        };
        let plans = plan_contacts(&RawEvent::Contact(e));
        assert_eq!(plans.len(), 1);
        assert_eq!(plans[0].name, "Ana Maria");
        assert!(!plans[0].with_base64);
    }

    #[test]
    fn contact_without_name_is_dropped() {
        let e = ContactEvent {
            jid: jid(),
            ..Default::default()
        };
        assert!(plan_contacts(&RawEvent::Contact(e)).is_empty());
    }

    #[test]
    fn chat_id_names_are_rejected() {
        let push = PushNameEvent {
            jid: jid(),
            new_push_name: "120363@g.us".into(),
            old_push_name: "Ana".into(),
        };
        assert!(plan_contacts(&RawEvent::PushName(push)).is_empty());

        let group = GroupInfoEvent {
            jid: Jid::new("120363", "g.us"),
            name: Some("5511@s.whatsapp.net".into()),
        };
        assert!(plan_contacts(&RawEvent::GroupInfo(group)).is_empty());

        let broadcast = PushNameEvent {
            jid: jid(),
            new_push_name: "1700000@broadcast".into(),
            old_push_name: String::new(),
        };
        assert!(plan_contacts(&RawEvent::PushName(broadcast)).is_empty());
    }

    #[test]
    fn push_name_falls_back_to_old() {
        let e = PushNameEvent {
            jid: jid(),
            new_push_name: String::new(),
            old_push_name: "Old".into(),
        };
        assert_eq!(plan_contacts(&RawEvent::PushName(e))[0].name, "Old");
    }

    #[test]
    fn business_name_is_emitted_without_a_name() {
        let e = BusinessNameEvent {
            jid: jid(),
            ..Default::default()
        };
        let plans = plan_contacts(&RawEvent::BusinessName(e));
        assert_eq!(plans.len(), 1);
        assert_eq!(plans[0].name, "");
        assert!(plans[0].with_base64);

        let e = BusinessNameEvent {
            jid: jid(),
            verified_name: "Acme Ltd".into(),
            ..Default::default()
        };
        assert_eq!(plan_contacts(&RawEvent::BusinessName(e))[0].name, "Acme Ltd");
    }

    #[test]
    fn picture_requires_a_url() {
        let plans = plan_contacts(&RawEvent::Picture(PictureEvent {
            jid: jid(),
            ..Default::default()
        }));
        assert!(plans[0].require_picture);
        assert!(plans[0].with_base64);
    }

    #[test]
    fn history_dedupes_in_first_seen_order() {
        let e = HistorySyncEvent {
            push_names: vec![
                HistoryPushName {
                    id: "5511@s.whatsapp.net".into(),
                    push_name: "Ana".into(),
                },
                HistoryPushName {
                    id: "5522@s.whatsapp.net".into(),
                    push_name: String::new(),
                },
                HistoryPushName {
                    id: "5533@s.whatsapp.net".into(),
                    push_name: "Bia".into(),
                },
            ],
            conversations: vec![HistoryConversation {
                id: "5511@s.whatsapp.net".into(),
                name: String::new(),
                display_name: "Ana (work)".into(),
                username: String::new(),
            }],
        };
        let plans = history_identities(&e).unwrap();
        let names: Vec<_> = plans.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["Ana (work)", "Bia"]);
        assert_eq!(plans[0].jid.to_string(), "5511@s.whatsapp.net");
    }

    #[test]
    fn history_rejects_whole_batch_on_chat_id_name() {
        let e = HistorySyncEvent {
            push_names: vec![
                HistoryPushName {
                    id: "5511@s.whatsapp.net".into(),
                    push_name: "Ana".into(),
                },
                HistoryPushName {
                    id: "5533@s.whatsapp.net".into(),
                    push_name: "5533@s.whatsapp.net".into(),
                },
            ],
            conversations: Vec::new(),
        };
        assert!(history_identities(&e).is_none());
        assert!(plan_contacts(&RawEvent::HistorySync(e)).is_empty());
    }

    #[test]
    fn history_rejects_whole_batch_on_bad_id() {
        let e = HistorySyncEvent {
            push_names: Vec::new(),
            conversations: vec![HistoryConversation {
                id: "broken@".into(),
                name: "Someone".into(),
                ..Default::default()
            }],
        };
        assert!(history_identities(&e).is_none());
    }
}
