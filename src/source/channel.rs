//! Channel-based data source.
//!
//! Receives dashboard snapshots via a tokio watch channel. The API poller
//! pushes snapshots through it; tests and embedders can push their own.

use tokio::sync::watch;

use super::{DashboardSnapshot, DataSource};

/// A data source that receives dashboard snapshots via a channel.
///
/// # Example
///
/// ```
/// use secador_monitor::ChannelSource;
///
/// let (tx, source) = ChannelSource::create("api.example.com");
/// ```
#[derive(Debug)]
pub struct ChannelSource {
    receiver: watch::Receiver<DashboardSnapshot>,
    description: String,
    /// Track if we've returned the initial value yet
    initial_returned: bool,
}

impl ChannelSource {
    /// Create a new channel source from the receiving end of a watch channel.
    pub fn new(receiver: watch::Receiver<DashboardSnapshot>, source_description: &str) -> Self {
        let description = format!("channel: {}", source_description);
        Self {
            receiver,
            description,
            initial_returned: false,
        }
    }

    /// Create a channel pair for sending snapshots to a ChannelSource.
    pub fn create(source_description: &str) -> (watch::Sender<DashboardSnapshot>, Self) {
        let (tx, rx) = watch::channel(DashboardSnapshot::default());
        let source = Self::new(rx, source_description);
        (tx, source)
    }
}

impl DataSource for ChannelSource {
    fn poll(&mut self) -> Option<DashboardSnapshot> {
        if !self.initial_returned {
            self.initial_returned = true;
            self.receiver.mark_changed();
        }

        if self.receiver.has_changed().unwrap_or(false) {
            Some(self.receiver.borrow_and_update().clone())
        } else {
            None
        }
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn error(&self) -> Option<&str> {
        None
    }
}
