//! Progress reporting for split runs.
//!
//! A [`Reporter`] is handed to each run instead of writing to a global logger, so a caller
//! can log the events, forward them to another task, or ignore them.

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::reference::UnresolvedReference;

/// Something that happened while splitting a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SplitEvent {
    /// A group is about to be resolved and assembled.
    GroupStarted {
        /// The group name.
        group: String,
        /// Number of operations in the group.
        operations: usize,
    },
    /// A reference of the group targets a missing component.
    UnresolvedReference {
        /// The group name.
        group: String,
        /// The missing target.
        reference: UnresolvedReference,
    },
    /// The output document of the group is ready.
    GroupAssembled {
        /// The group name.
        group: String,
        /// Number of path items in the output.
        paths: usize,
        /// Number of components in the output.
        components: usize,
    },
}

/// Receives [`SplitEvent`]s.
///
/// Reporters are shared by concurrent group tasks and must be [`Send`] and [`Sync`].
pub trait Reporter: Send + Sync {
    /// Handles one event.
    fn report(&self, event: SplitEvent);
}

/// Discards every event.
impl Reporter for () {
    fn report(&self, _event: SplitEvent) {}
}

/// Emits every event as a `tracing` event.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn report(&self, event: SplitEvent) {
        match event {
            SplitEvent::GroupStarted { group, operations } => {
                debug!(%group, operations, "splitting group");
            }
            SplitEvent::UnresolvedReference { group, reference } => {
                warn!(%group, %reference, "unresolved reference");
            }
            SplitEvent::GroupAssembled {
                group,
                paths,
                components,
            } => {
                info!(%group, paths, components, "group assembled");
            }
        }
    }
}

/// Forwards every event into an unbounded channel.
///
/// Events sent after the receiver is dropped are discarded.
#[derive(Debug, Clone)]
pub struct ChannelReporter {
    sender: mpsc::UnboundedSender<SplitEvent>,
}

impl ChannelReporter {
    /// Creates a reporter sending into an existing channel.
    pub fn new(sender: mpsc::UnboundedSender<SplitEvent>) -> Self {
        Self { sender }
    }

    /// Creates a reporter along with the receiving end of its channel.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<SplitEvent>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self::new(sender), receiver)
    }
}

impl Reporter for ChannelReporter {
    fn report(&self, event: SplitEvent) {
        if self.sender.send(event).is_err() {
            debug!("split event receiver dropped");
        }
    }
}
