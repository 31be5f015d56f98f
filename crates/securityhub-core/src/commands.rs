//! Command state machines for user-controlled fields.
//!
//! A field that only changes after the server acknowledges a command (the
//! site's [`Mode`], each sensor's `enabled` flag) is wrapped in a
//! [`Controlled`]. Issuing a command yields a [`Ticket`]; the response is fed
//! back through [`Controlled::apply`] or [`Controlled::reject`]. Only the most
//! recently issued ticket can resolve the field, so when two commands race the
//! later one always decides and the earlier response is reported as
//! [`Resolution::Superseded`].
//!
//! ```
//! use securityhub_core::commands::{Controlled, Resolution};
//! use securityhub_types::Mode;
//!
//! let mut mode = Controlled::new(Mode::Disarm);
//! let first = mode.begin(Mode::Stay);
//! let second = mode.begin(Mode::Away);
//!
//! assert_eq!(mode.apply(&second), Resolution::Applied);
//! assert_eq!(mode.apply(&first), Resolution::Superseded);
//! assert_eq!(*mode.value(), Mode::Away);
//! ```

use serde::{Deserialize, Serialize};

use securityhub_types::{Mode, SensorKey};

/// Error banner raised when a mode command fails.
pub const MODE_FAILED_BANNER: &str =
    "Failed to update system mode. Please ensure the backend server is running.";

/// Error banner raised when a sensor command fails.
pub const SENSOR_FAILED_BANNER: &str =
    "Failed to toggle sensor. Please ensure the backend server is running.";

/// Where a controlled field stands with respect to its last command.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum CommandPhase<T> {
    /// No command issued yet.
    #[default]
    Idle,
    /// A command is in flight.
    Pending { target: T, seq: u64 },
    /// The last command was acknowledged.
    Applied { value: T },
    /// The last command failed; the value was left unchanged.
    Rejected { target: T, reason: String },
}

/// Handle for one issued command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket<T> {
    seq: u64,
    target: T,
}

impl<T> Ticket<T> {
    /// Sequence number, increasing per field.
    pub fn seq(&self) -> u64 {
        self.seq
    }

    /// Value the command asks for.
    pub fn target(&self) -> &T {
        &self.target
    }
}

/// Outcome of resolving a ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// The target value was adopted.
    Applied,
    /// The value was left unchanged.
    Rejected,
    /// A newer command was issued since; the response was ignored.
    Superseded,
}

/// A value that changes only when a command for it is acknowledged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Controlled<T> {
    value: T,
    phase: CommandPhase<T>,
    #[serde(skip)]
    issued: u64,
}

impl<T: Clone> Controlled<T> {
    pub fn new(value: T) -> Self {
        Self {
            value,
            phase: CommandPhase::Idle,
            issued: 0,
        }
    }

    /// The value as last acknowledged.
    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn phase(&self) -> &CommandPhase<T> {
        &self.phase
    }

    /// Whether a command is awaiting its response.
    pub fn is_pending(&self) -> bool {
        matches!(self.phase, CommandPhase::Pending { .. })
    }

    /// Issue a command; any earlier ticket becomes stale.
    pub fn begin(&mut self, target: T) -> Ticket<T> {
        self.issued += 1;
        self.phase = CommandPhase::Pending {
            target: target.clone(),
            seq: self.issued,
        };
        Ticket {
            seq: self.issued,
            target,
        }
    }

    /// Adopt the ticket's target if it is still the current command.
    pub fn apply(&mut self, ticket: &Ticket<T>) -> Resolution {
        if !self.is_current(ticket) {
            return Resolution::Superseded;
        }
        self.value = ticket.target.clone();
        self.phase = CommandPhase::Applied {
            value: ticket.target.clone(),
        };
        Resolution::Applied
    }

    /// Record a failed command, leaving the value unchanged.
    pub fn reject(&mut self, ticket: &Ticket<T>, reason: impl Into<String>) -> Resolution {
        if !self.is_current(ticket) {
            return Resolution::Superseded;
        }
        self.phase = CommandPhase::Rejected {
            target: ticket.target.clone(),
            reason: reason.into(),
        };
        Resolution::Rejected
    }

    fn is_current(&self, ticket: &Ticket<T>) -> bool {
        matches!(self.phase, CommandPhase::Pending { seq, .. } if seq == ticket.seq)
    }
}

impl<T: Clone + Default> Default for Controlled<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

/// Notification text for an acknowledged mode change.
pub fn mode_applied_message(mode: Mode) -> String {
    format!("System mode set to {}", mode)
}

/// Notification text for a failed mode change.
pub fn mode_rejected_message(mode: Mode) -> String {
    format!("Failed to set system mode to {}", mode)
}

/// Notification text for an acknowledged sensor toggle.
pub fn sensor_applied_message(sensor: &SensorKey, enabled: bool) -> String {
    format!("{} sensor {}", sensor.label(), enabled_word(enabled))
}

/// Notification text for a failed sensor toggle.
pub fn sensor_rejected_message(sensor: &SensorKey, enabled: bool) -> String {
    let verb = if enabled { "enable" } else { "disable" };
    format!("Failed to {} {} sensor", verb, sensor.label())
}

fn enabled_word(enabled: bool) -> &'static str {
    if enabled { "enabled" } else { "disabled" }
}
