// Repository trait for the persisted snapshot slot

/// A string-valued key-value slot, the shape of browser local storage.
pub trait KeyValueStore: Send + Sync {
    /// Read the value under `key`, `None` if the key is absent
    fn get(&self, key: &str) -> anyhow::Result<Option<String>>;

    /// Replace the value under `key`
    fn set(&self, key: &str, value: &str) -> anyhow::Result<()>;

    /// Delete `key` entirely; removing an absent key is not an error
    fn remove(&self, key: &str) -> anyhow::Result<()>;
}
