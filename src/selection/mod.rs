//! Source/destination selection state machine
//!
//! Decides which role a resolved node is assigned to and hands out the
//! sequence-numbered tickets used to drop stale lookup responses.

use crate::geo::GeoPoint;
use crate::resolver::ResolvedNode;
use serde::{Deserialize, Serialize};

/// Endpoint of the route a marker represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Source,
    Destination,
}

impl Role {
    /// The opposite role
    pub fn other(self) -> Self {
        match self {
            Self::Source => Self::Destination,
            Self::Destination => Self::Source,
        }
    }

    /// Short label used in marker popups
    pub fn label(self) -> &'static str {
        match self {
            Self::Source => "Source",
            Self::Destination => "Dest.",
        }
    }
}

impl Default for Role {
    fn default() -> Self {
        Self::Source
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Source => f.pad("source"),
            Self::Destination => f.pad("destination"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "src" | "source" => Ok(Self::Source),
            "dest" | "dst" | "destination" => Ok(Self::Destination),
            _ => Err(format!("Unknown role: {}", s)),
        }
    }
}

/// A resolved node bound to a role, ready for the marker registry
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoleAssignment {
    pub role: Role,
    pub point: GeoPoint,
    pub node_id: Option<u64>,
}

/// How the response to a lookup will be assigned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// Map click: the active role at request time
    Toggle(Role),
    /// Form entry for an explicit role
    Manual(Role),
}

impl Target {
    pub fn role(self) -> Role {
        match self {
            Self::Toggle(role) | Self::Manual(role) => role,
        }
    }
}

/// Tag attached to an outstanding lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    pub seq: u64,
    pub target: Target,
}

/// Owns the active role and the request sequence
#[derive(Debug, Clone)]
pub struct SelectionMachine {
    active: Role,
    first: Role,
    issued: u64,
    current: Option<u64>,
}

impl SelectionMachine {
    /// Create a machine whose first click assigns `first`
    pub fn new(first: Role) -> Self {
        Self {
            active: first,
            first,
            issued: 0,
            current: None,
        }
    }

    /// Role the next click will be assigned to
    pub fn active_role(&self) -> Role {
        self.active
    }

    /// Assign a click resolution to the active role, then flip it
    pub fn on_resolved(&mut self, node: ResolvedNode) -> RoleAssignment {
        self.toggle_from(self.active, node)
    }

    /// Assign to `role` and make the other role active
    fn toggle_from(&mut self, role: Role, node: ResolvedNode) -> RoleAssignment {
        self.active = role.other();
        RoleAssignment {
            role,
            point: node.point,
            node_id: Some(node.node_id),
        }
    }

    /// Assign directly to `role`; the active role is left alone
    pub fn on_manual_assignment(&mut self, role: Role, node: ResolvedNode) -> RoleAssignment {
        RoleAssignment {
            role,
            point: node.point,
            node_id: Some(node.node_id),
        }
    }

    /// Ticket for a click, capturing the active role
    pub fn issue_toggle(&mut self) -> Ticket {
        self.issue(Target::Toggle(self.active))
    }

    /// Ticket for a form entry
    pub fn issue_manual(&mut self, role: Role) -> Ticket {
        self.issue(Target::Manual(role))
    }

    /// Hand out the next ticket; every earlier ticket becomes stale
    pub fn issue(&mut self, target: Target) -> Ticket {
        self.issued += 1;
        self.current = Some(self.issued);
        Ticket {
            seq: self.issued,
            target,
        }
    }

    /// True only for the most recently issued ticket
    pub fn is_current(&self, ticket: &Ticket) -> bool {
        self.current == Some(ticket.seq)
    }

    /// Apply a resolution carried by `ticket`
    ///
    /// Returns `None` for a stale ticket; neither the role nor the sequence
    /// changes in that case.
    pub fn apply(&mut self, ticket: &Ticket, node: ResolvedNode) -> Option<RoleAssignment> {
        if !self.is_current(ticket) {
            return None;
        }
        self.current = None;
        let assignment = match ticket.target {
            Target::Toggle(role) => self.toggle_from(role, node),
            Target::Manual(role) => self.on_manual_assignment(role, node),
        };
        Some(assignment)
    }

    /// Drop the current ticket without issuing a new one
    pub fn invalidate(&mut self) {
        self.current = None;
    }

    /// Back to the initial role with no ticket outstanding
    pub fn reset(&mut self) {
        self.active = self.first;
        self.invalidate();
    }
}

impl Default for SelectionMachine {
    fn default() -> Self {
        Self::new(Role::default())
    }
}
