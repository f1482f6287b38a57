use serde::{
    ser::{Error as _, SerializeMap},
    Serialize,
};

use crate::binary::LocalizationBinary;

impl Serialize for LocalizationBinary {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for entry in self.entries() {
            let (key, text) = entry.map_err(S::Error::custom)?;
            map.serialize_entry(&key.to_string(), &text)?;
        }
        map.end()
    }
}
