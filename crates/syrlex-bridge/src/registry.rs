//! Process-wide device registry.

use std::collections::HashMap;
use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tracing::debug;

use syrlex_protocol::derive_identifier;

use crate::device::Device;

/// Concurrency-safe identifier -> device map.
///
/// Owned by the bridge service; there is no ambient global, so tests can run
/// any number of independent registries. Insertion goes through the shard
/// entry lock, which is what makes first-contact registration exactly-once
/// under concurrent polls.
#[derive(Debug, Default)]
pub struct DeviceRegistry {
    devices: DashMap<String, Arc<Device>>,
}

impl DeviceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert-if-absent lookup.
    ///
    /// Returns the device plus whether this call created it. Exactly one of
    /// two concurrent calls for the same identifier observes `true`; that
    /// caller performs the one-time discovery/availability announcement.
    pub fn identify_or_register(
        &self,
        model: &str,
        serial: &str,
        firmware_version: &str,
        base_url: &str,
    ) -> (Arc<Device>, bool) {
        let identifier = derive_identifier(model, serial);
        match self.devices.entry(identifier) {
            Entry::Occupied(entry) => (entry.get().clone(), false),
            Entry::Vacant(entry) => {
                let device = Arc::new(Device::new(model, serial, firmware_version, base_url));
                entry.insert(device.clone());
                (device, true)
            }
        }
    }

    /// Look up a known device.
    pub fn get(&self, identifier: &str) -> Option<Arc<Device>> {
        self.devices.get(identifier).map(|entry| entry.value().clone())
    }

    /// Queue a setter for a known device; unknown identifiers are dropped.
    pub fn enqueue_setter(&self, identifier: &str, mnemonic: &str, value: &str) -> bool {
        match self.get(identifier) {
            Some(device) => {
                device.enqueue_setter(mnemonic, value);
                true
            }
            None => {
                debug!(identifier, mnemonic, "dropping setter for unknown device");
                false
            }
        }
    }

    /// Atomically remove and return a device's pending setters.
    pub fn drain_setters(&self, identifier: &str) -> HashMap<String, String> {
        self.get(identifier)
            .map(|device| device.drain_setters())
            .unwrap_or_default()
    }

    /// Snapshot of every known device.
    pub fn all(&self) -> Vec<Arc<Device>> {
        self.devices.iter().map(|entry| entry.value().clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_identify_returns_existing_device() {
        let registry = DeviceRegistry::new();
        let (first, created) = registry.identify_or_register("LEXplus10S", "123", "1.9", "");
        assert!(created);
        let (second, created) = registry.identify_or_register("LEXplus10S", "123", "1.8", "");
        assert!(!created);
        // Identity fields never change after first contact.
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.firmware_version, "1.9");
    }

    #[test]
    fn enqueue_for_unknown_device_is_dropped() {
        let registry = DeviceRegistry::new();
        assert!(!registry.enqueue_setter("ghost", "setSV1", "5"));
        assert!(registry.drain_setters("ghost").is_empty());
    }

    #[test]
    fn drain_returns_queued_setters_once() {
        let registry = DeviceRegistry::new();
        let (device, _) = registry.identify_or_register("LEXplus10S", "123", "1.9", "");
        registry.enqueue_setter(&device.identifier, "setRPW", "5");
        let drained = registry.drain_setters(&device.identifier);
        assert_eq!(drained["setRPW"], "5");
        assert!(registry.drain_setters(&device.identifier).is_empty());
    }

    #[tokio::test]
    async fn concurrent_registration_creates_one_device() {
        let registry = Arc::new(DeviceRegistry::new());
        let mut handles = Vec::new();
        for _ in 0..16 {
            let registry = registry.clone();
            handles.push(tokio::spawn(async move {
                let (_, created) = registry.identify_or_register("LEXplus10S", "123", "1.9", "");
                created
            }));
        }
        let mut created_count = 0;
        for handle in handles {
            if handle.await.unwrap() {
                created_count += 1;
            }
        }
        assert_eq!(created_count, 1);
        assert_eq!(registry.len(), 1);
    }

    #[tokio::test]
    async fn drain_never_loses_or_duplicates_setters() {
        let registry = Arc::new(DeviceRegistry::new());
        let (device, _) = registry.identify_or_register("LEXplus10S", "123", "1.9", "");
        let identifier = device.identifier.clone();

        let writer = {
            let registry = registry.clone();
            let identifier = identifier.clone();
            tokio::spawn(async move {
                for i in 0..200 {
                    registry.enqueue_setter(&identifier, &format!("set{i:03}"), "1");
                    tokio::task::yield_now().await;
                }
            })
        };
        let reader = {
            let registry = registry.clone();
            let identifier = identifier.clone();
            tokio::spawn(async move {
                let mut seen = std::collections::HashSet::new();
                for _ in 0..200 {
                    for (mnemonic, _) in registry.drain_setters(&identifier) {
                        // A drained setter is never reported twice.
                        assert!(seen.insert(mnemonic));
                    }
                    tokio::task::yield_now().await;
                }
                seen
            })
        };

        writer.await.unwrap();
        let mut seen = reader.await.unwrap();
        for (mnemonic, _) in registry.drain_setters(&identifier) {
            assert!(seen.insert(mnemonic));
        }
        // Every enqueued mnemonic was delivered exactly once.
        assert_eq!(seen.len(), 200);
    }
}
