//! Request channels.
//!
//! A channel tracks one asynchronous operation track (list fetch, single
//! fetch) as an explicit state machine. Every request takes a generation
//! number when it starts; completions carrying an older generation are
//! dropped, so a newer request always supersedes an older one.

use serde::Serialize;

/// Lifecycle of a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    /// Nothing requested yet, or reset.
    #[default]
    Idle,
    /// A request is in flight.
    Loading,
    /// The last request succeeded, or the value was set locally.
    Success,
    /// The last request failed.
    Error,
}

/// Events accepted by [`Channel::apply`].
#[derive(Debug, Clone)]
pub enum ChannelEvent<T> {
    /// A request started. `retain` keeps the current value visible while
    /// loading.
    Started {
        /// Keep the previous value while loading.
        retain: bool,
    },
    /// The request with this generation succeeded.
    Succeeded {
        /// Generation returned by the matching `Started`.
        generation: u64,
        /// Response value.
        value: T,
    },
    /// The request with this generation failed.
    Failed {
        /// Generation returned by the matching `Started`.
        generation: u64,
        /// Failure message; blank messages are stored as `None`.
        message: Option<String>,
    },
    /// The value was replaced locally; any in-flight request is superseded.
    Replaced(T),
    /// Back to idle with no value; any in-flight request is superseded.
    Reset,
}

/// State of one request channel.
#[derive(Debug, Clone)]
pub struct Channel<T> {
    status: RequestStatus,
    value: Option<T>,
    error: Option<String>,
    generation: u64,
}

impl<T> Default for Channel<T> {
    fn default() -> Self {
        Self {
            status: RequestStatus::Idle,
            value: None,
            error: None,
            generation: 0,
        }
    }
}

impl<T> Channel<T> {
    /// Creates an idle channel.
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies an event.
    ///
    /// Returns `false` when the event was a stale completion and the state
    /// did not change.
    pub fn apply(&mut self, event: ChannelEvent<T>) -> bool {
        match event {
            ChannelEvent::Started { retain } => {
                self.generation += 1;
                self.status = RequestStatus::Loading;
                self.error = None;
                if !retain {
                    self.value = None;
                }
            }
            ChannelEvent::Succeeded { generation, value } => {
                if generation != self.generation || self.status != RequestStatus::Loading {
                    return false;
                }
                self.status = RequestStatus::Success;
                self.value = Some(value);
                self.error = None;
            }
            ChannelEvent::Failed {
                generation,
                message,
            } => {
                if generation != self.generation || self.status != RequestStatus::Loading {
                    return false;
                }
                self.status = RequestStatus::Error;
                self.error = message.filter(|m| !m.trim().is_empty());
            }
            ChannelEvent::Replaced(value) => {
                self.generation += 1;
                self.status = RequestStatus::Success;
                self.value = Some(value);
                self.error = None;
            }
            ChannelEvent::Reset => {
                self.generation += 1;
                self.status = RequestStatus::Idle;
                self.value = None;
                self.error = None;
            }
        }
        true
    }

    /// Starts a request and returns its generation.
    pub fn begin(&mut self, retain: bool) -> u64 {
        self.apply(ChannelEvent::Started { retain });
        self.generation
    }

    /// Completes the request with `generation` successfully.
    pub fn succeed(&mut self, generation: u64, value: T) -> bool {
        self.apply(ChannelEvent::Succeeded { generation, value })
    }

    /// Completes the request with `generation` with a failure.
    pub fn fail(&mut self, generation: u64, message: Option<String>) -> bool {
        self.apply(ChannelEvent::Failed {
            generation,
            message,
        })
    }

    /// Withdraws the request with `generation` without a result, as when
    /// its caller stopped waiting. The channel settles on its retained
    /// value, or idle when there is none.
    pub fn abandon(&mut self, generation: u64) -> bool {
        if generation != self.generation || self.status != RequestStatus::Loading {
            return false;
        }
        self.status = if self.value.is_some() {
            RequestStatus::Success
        } else {
            RequestStatus::Idle
        };
        true
    }

    /// Resets the channel to idle.
    pub fn reset(&mut self) {
        self.apply(ChannelEvent::Reset);
    }

    /// Current status.
    pub fn status(&self) -> RequestStatus {
        self.status
    }

    /// Returns true while a request is in flight.
    pub fn is_loading(&self) -> bool {
        self.status == RequestStatus::Loading
    }

    /// Current value, if any.
    pub fn value(&self) -> Option<&T> {
        self.value.as_ref()
    }

    /// Current error message, if any.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Generation of the most recent request.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

impl<T: Clone + Default> Channel<T> {
    /// Replaces the value with `f` applied to the current value (or the
    /// default when there is none).
    pub fn update<F>(&mut self, f: F)
    where
        F: FnOnce(&mut T),
    {
        let mut value = self.value.clone().unwrap_or_default();
        f(&mut value);
        self.apply(ChannelEvent::Replaced(value));
    }
}

// ============================================================================
// Mutation State
// ============================================================================

/// State of the mutation track (create, update, delete).
///
/// Mutations are counted rather than generation-checked: every mutation is
/// processed to completion and the most recent completion decides the error.
#[derive(Debug, Clone, Default)]
pub struct MutationState {
    pending: usize,
    error: Option<String>,
}

impl MutationState {
    /// Records a newly issued mutation.
    pub fn begin(&mut self) {
        self.pending += 1;
    }

    /// Records a successful completion.
    pub fn succeed(&mut self) {
        self.pending = self.pending.saturating_sub(1);
        self.error = None;
    }

    /// Records a failed completion.
    pub fn fail(&mut self, message: String) {
        self.pending = self.pending.saturating_sub(1);
        self.error = Some(message);
    }

    /// Withdraws a mutation that will never complete. The last error stays.
    pub fn abandon(&mut self) {
        self.pending = self.pending.saturating_sub(1);
    }

    /// Number of mutations issued but not completed.
    pub fn pending(&self) -> usize {
        self.pending
    }

    /// Returns true while any mutation is pending.
    pub fn is_loading(&self) -> bool {
        self.pending > 0
    }

    /// Error of the most recent completion, if it failed.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_flow() {
        let mut channel: Channel<u32> = Channel::new();
        assert_eq!(channel.status(), RequestStatus::Idle);

        let generation = channel.begin(false);
        assert!(channel.is_loading());
        assert!(channel.succeed(generation, 7));
        assert_eq!(channel.status(), RequestStatus::Success);
        assert_eq!(channel.value(), Some(&7));
    }

    #[test]
    fn test_stale_completion_is_dropped() {
        let mut channel: Channel<u32> = Channel::new();
        let first = channel.begin(false);
        let second = channel.begin(false);

        assert!(!channel.succeed(first, 1));
        assert!(channel.is_loading());
        assert!(channel.succeed(second, 2));
        assert_eq!(channel.value(), Some(&2));

        // A late failure for the first request changes nothing either.
        assert!(!channel.fail(first, Some("boom".to_string())));
        assert_eq!(channel.error(), None);
    }

    #[test]
    fn test_retain_keeps_value_while_loading() {
        let mut channel: Channel<u32> = Channel::new();
        let generation = channel.begin(false);
        channel.succeed(generation, 1);

        let generation = channel.begin(true);
        assert_eq!(channel.value(), Some(&1));
        channel.fail(generation, Some("offline".to_string()));
        assert_eq!(channel.value(), Some(&1));
        assert_eq!(channel.error(), Some("offline"));

        channel.begin(false);
        assert_eq!(channel.value(), None);
    }

    #[test]
    fn test_blank_failure_message_is_none() {
        let mut channel: Channel<u32> = Channel::new();
        let generation = channel.begin(false);
        channel.fail(generation, Some("   ".to_string()));
        assert_eq!(channel.status(), RequestStatus::Error);
        assert_eq!(channel.error(), None);
    }

    #[test]
    fn test_reset_and_update_supersede_in_flight() {
        let mut channel: Channel<Vec<u32>> = Channel::new();
        let generation = channel.begin(false);
        channel.update(|v| v.push(3));
        assert_eq!(channel.status(), RequestStatus::Success);
        assert!(!channel.succeed(generation, vec![1, 2]));
        assert_eq!(channel.value(), Some(&vec![3]));

        let generation = channel.begin(true);
        channel.reset();
        assert!(!channel.succeed(generation, vec![9]));
        assert_eq!(channel.value(), None);
        assert_eq!(channel.status(), RequestStatus::Idle);
    }

    #[test]
    fn test_abandon_settles_current_request_only() {
        let mut channel: Channel<u32> = Channel::new();
        let generation = channel.begin(false);
        assert!(channel.abandon(generation));
        assert_eq!(channel.status(), RequestStatus::Idle);

        let generation = channel.begin(false);
        channel.succeed(generation, 4);
        let stale = channel.begin(true);
        let current = channel.begin(true);
        assert!(!channel.abandon(stale));
        assert!(channel.is_loading());
        assert!(channel.abandon(current));
        assert_eq!(channel.status(), RequestStatus::Success);
        assert_eq!(channel.value(), Some(&4));
    }

    #[test]
    fn test_mutation_state() {
        let mut state = MutationState::default();
        state.begin();
        state.begin();
        assert_eq!(state.pending(), 2);

        state.fail("Failed to update product".to_string());
        assert!(state.is_loading());
        assert_eq!(state.error(), Some("Failed to update product"));

        state.succeed();
        assert!(!state.is_loading());
        assert_eq!(state.error(), None);

        state.begin();
        state.abandon();
        assert!(!state.is_loading());
    }
}
