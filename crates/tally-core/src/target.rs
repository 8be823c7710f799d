//! Target: the user-or-group endpoint of acknowledgements and transfers.
//!
//! A target holds only identity and a pre-rendered link. Resolving display
//! names and URLs is the job of whoever loads the events.

use std::fmt;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};
use uuid::Uuid;

/// Which kind of entity a [`Target`] refers to.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TargetKind {
  User,
  Group,
}

impl TargetKind {
  pub fn as_str(self) -> &'static str { self.into() }
}

/// An immutable reference to either a user or a group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
  pub kind: TargetKind,
  pub id:   Uuid,
  /// Renderable link to the entity, e.g. an HTML anchor.
  pub link: String,
}

impl Target {
  pub fn user(id: Uuid, link: impl Into<String>) -> Self {
    Self { kind: TargetKind::User, id, link: link.into() }
  }

  pub fn group(id: Uuid, link: impl Into<String>) -> Self {
    Self { kind: TargetKind::Group, id, link: link.into() }
  }

  pub fn is_user(&self) -> bool { self.kind == TargetKind::User }

  /// The user id, if this target is a user.
  pub fn user_id(&self) -> Option<Uuid> { self.is_user().then_some(self.id) }
}

/// `"{kind} {link}"`, the way targets appear in history descriptions.
impl fmt::Display for Target {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{} {}", self.kind, self.link)
  }
}
