//! Depot decryption keys from key-file content.

use serde::Serialize;
use tracing::debug;

use crate::ids::NumericId;

const KEY_FIELD: &str = "DecryptionKey";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DepotKey {
    pub depot: NumericId,
    pub key: String,
}

/// Extract one [`DepotKey`] per depot section carrying a decryption key.
///
/// Sections are found at any depth, so both a bare list of depot sections
/// and the usual `"depots" { ... }` wrapper work. Unparseable input, sections
/// whose name is not a depot id, and empty keys contribute nothing.
pub fn parse_key_file(content: &[u8]) -> Vec<DepotKey> {
    let doc = match depotsync_vdf::parse_bytes(content) {
        Ok(doc) => doc,
        Err(e) => {
            debug!(error = %e, "key file did not parse; no keys taken from it");
            return Vec::new();
        }
    };

    let mut keys = Vec::new();
    doc.walk_sections(&mut |name, section| {
        let Some(key) = section.get_str(KEY_FIELD) else {
            return;
        };
        let key = key.trim();
        if key.is_empty() {
            return;
        }
        match NumericId::new(name) {
            Ok(depot) => keys.push(DepotKey {
                depot,
                key: key.to_string(),
            }),
            Err(e) => debug!(section = name, error = %e, "skipping keyed section"),
        }
    });
    keys
}
