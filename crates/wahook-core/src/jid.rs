// SPDX-FileCopyrightText: 2026 Wahook Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Chat identifiers (`user@server`).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::WahookError;

/// Server for regular user chats.
pub const USER_SERVER: &str = "s.whatsapp.net";
/// Server for group chats.
pub const GROUP_SERVER: &str = "g.us";
/// Server for broadcast lists and status updates.
pub const BROADCAST_SERVER: &str = "broadcast";

/// A chat identifier as produced by the session runtime.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Jid {
    pub user: String,
    pub server: String,
}

impl Jid {
    pub fn new(user: impl Into<String>, server: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            server: server.into(),
        }
    }

    /// Build a user JID from a bare phone number.
    pub fn user(number: impl Into<String>) -> Self {
        Self::new(number, USER_SERVER)
    }

    pub fn is_empty(&self) -> bool {
        self.user.is_empty() && self.server.is_empty()
    }

    pub fn is_group(&self) -> bool {
        self.server == GROUP_SERVER
    }

    pub fn is_broadcast(&self) -> bool {
        self.server == BROADCAST_SERVER
    }

    /// The `status@broadcast` pseudo-chat carrying status updates.
    pub fn is_status_broadcast(&self) -> bool {
        self.is_broadcast() && self.user == "status"
    }

    /// Strip the device suffix (`user:device@server` -> `user@server`).
    pub fn to_non_device(&self) -> Self {
        let user = self
            .user
            .split_once(':')
            .map(|(u, _)| u)
            .unwrap_or(&self.user);
        Self::new(user, self.server.clone())
    }
}

impl fmt::Display for Jid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.user.is_empty() {
            write!(f, "{}", self.server)
        } else {
            write!(f, "{}@{}", self.user, self.server)
        }
    }
}

impl FromStr for Jid {
    type Err = WahookError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(WahookError::Conversion("empty jid".into()));
        }
        match s.rsplit_once('@') {
            Some((user, server)) if !server.is_empty() => Ok(Self::new(user, server)),
            Some(_) => Err(WahookError::Conversion(format!("jid `{s}` has no server"))),
            // A bare server (e.g. "g.us") or a bare number.
            None if s.contains('.') => Ok(Self::new("", s)),
            None => Ok(Self::user(s)),
        }
    }
}

impl Serialize for Jid {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Jid {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// True when a display-name candidate is really a chat identifier
/// (`x@g.us`, `x@broadcast` or `x@s.whatsapp.net`). Such identities are never
/// emitted as contacts.
pub fn looks_like_chat_id(name: &str) -> bool {
    let mut parts = name.split('@');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(_), Some(server), None) => {
            server == GROUP_SERVER || server == BROADCAST_SERVER || server == USER_SERVER
        }
        _ => false,
    }
}
