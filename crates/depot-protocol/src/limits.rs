/// Upper bounds on declared payload sizes.
///
/// Every length field read off the wire is checked against these limits
/// before any allocation or streaming happens, so a hostile or corrupt size
/// field cannot cause unbounded memory use.
#[derive(Clone, Copy, Debug)]
pub struct WireLimits {
    /// Maximum label name payload in bytes.
    pub max_label_len: u64,
    /// Maximum object body in bytes.
    pub max_object_size: u64,
    /// Maximum manifest a client will buffer in memory.
    pub max_manifest_size: u64,
}

impl Default for WireLimits {
    fn default() -> Self {
        Self {
            max_label_len: 4 * 1024,
            max_object_size: 1024 * 1024 * 1024,
            max_manifest_size: 64 * 1024 * 1024,
        }
    }
}
