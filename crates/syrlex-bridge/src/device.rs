//! Device records tracked by the registry.

use std::collections::HashMap;
use std::sync::Mutex;

use syrlex_protocol::derive_identifier;

/// One known appliance.
///
/// Identity fields are immutable after construction; the identifier is
/// computed exactly once from model and serial. The only mutable state is
/// the pending-setter queue, guarded so the command stream can enqueue while
/// the poll stream drains.
#[derive(Debug)]
pub struct Device {
    pub identifier: String,
    pub model: String,
    pub serial: String,
    pub firmware_version: String,
    pub base_url: String,
    pending: Mutex<HashMap<String, String>>,
}

impl Device {
    pub fn new(
        model: impl Into<String>,
        serial: impl Into<String>,
        firmware_version: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        let model = model.into();
        let serial = serial.into();
        Self {
            identifier: derive_identifier(&model, &serial),
            model,
            serial,
            firmware_version: firmware_version.into(),
            base_url: base_url.into(),
            pending: Mutex::new(HashMap::new()),
        }
    }

    /// Queue a setter for delivery on the next poll.
    ///
    /// At most one value per mnemonic is held; a later enqueue overwrites an
    /// earlier unread one.
    pub fn enqueue_setter(&self, mnemonic: impl Into<String>, value: impl Into<String>) {
        let mut pending = self.pending.lock().expect("pending lock poisoned");
        pending.insert(mnemonic.into(), value.into());
    }

    /// Atomically remove and return every pending setter.
    ///
    /// An enqueue racing with the drain lands either in this result or in
    /// the next one, never both and never nowhere.
    pub fn drain_setters(&self) -> HashMap<String, String> {
        let mut pending = self.pending.lock().expect("pending lock poisoned");
        std::mem::take(&mut *pending)
    }

    /// Number of setters currently queued.
    pub fn pending_len(&self) -> usize {
        self.pending.lock().expect("pending lock poisoned").len()
    }
}
