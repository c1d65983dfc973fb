//! Single delivery channel with a stream front-end and a callback front-end.

use parking_lot::Mutex;
use tokio::sync::{mpsc, Mutex as AsyncMutex, MutexGuard};
use tokio::task::JoinHandle;

use crate::device::DeviceDescriptor;
use crate::error::{FinderError, Result};

enum Mode {
    Unset,
    Stream,
    Callback(JoinHandle<()>),
}

/// Carries resolved devices from resolution tasks to the consumer.
///
/// The first front-end used fixes the delivery model for the lifetime of
/// the owning finder.
pub(crate) struct Delivery {
    sender: mpsc::UnboundedSender<DeviceDescriptor>,
    receiver: AsyncMutex<Option<mpsc::UnboundedReceiver<DeviceDescriptor>>>,
    mode: Mutex<Mode>,
}

impl Delivery {
    pub(crate) fn new() -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        Self {
            sender,
            receiver: AsyncMutex::new(Some(receiver)),
            mode: Mutex::new(Mode::Unset),
        }
    }

    pub(crate) fn sender(&self) -> mpsc::UnboundedSender<DeviceDescriptor> {
        self.sender.clone()
    }

    /// Claim the stream front-end.
    pub(crate) fn use_stream(&self) -> Result<()> {
        let mut mode = self.mode.lock();
        match *mode {
            Mode::Callback(_) => Err(FinderError::DeliveryModeConflict("callback")),
            _ => {
                *mode = Mode::Stream;
                Ok(())
            }
        }
    }

    /// Receiver for the stream front-end; held by at most one stream at a time.
    pub(crate) async fn queue(&self) -> MutexGuard<'_, Option<mpsc::UnboundedReceiver<DeviceDescriptor>>> {
        self.receiver.lock().await
    }

    /// Claim the callback front-end and start draining the channel into `handler`.
    ///
    /// Must be called from within a Tokio runtime.
    pub(crate) fn use_callback<F>(&self, mut handler: F) -> Result<()>
    where
        F: FnMut(DeviceDescriptor) + Send + 'static,
    {
        let mut mode = self.mode.lock();
        match *mode {
            Mode::Unset => {}
            Mode::Stream => return Err(FinderError::DeliveryModeConflict("stream")),
            Mode::Callback(_) => return Err(FinderError::DeliveryModeConflict("callback")),
        }

        let mut receiver = self
            .receiver
            .try_lock()
            .ok()
            .and_then(|mut guard| guard.take())
            .ok_or(FinderError::DeliveryModeConflict("stream"))?;

        let task = tokio::spawn(async move {
            while let Some(device) = receiver.recv().await {
                handler(device);
            }
        });
        *mode = Mode::Callback(task);
        Ok(())
    }

    /// Stop the callback task, if any.
    pub(crate) async fn shutdown(&self) {
        let previous = std::mem::replace(&mut *self.mode.lock(), Mode::Unset);
        if let Mode::Callback(task) = previous {
            task.abort();
            let _ = task.await;
        }
    }
}

impl Drop for Delivery {
    fn drop(&mut self) {
        if let Mode::Callback(task) = &*self.mode.lock() {
            task.abort();
        }
    }
}
