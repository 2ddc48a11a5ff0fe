use crate::Error;
use std::{fmt, str::FromStr};
use uuid::Uuid;

/// A `uniqueidentifier` in the byte order of the wire.
///
/// The first three groups are little-endian on the wire, while a [`Uuid`]
/// keeps every group big-endian. [`Guid::to_uuid`] does the reordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Guid([u8; 16]);

impl Guid {
    /// Wraps the sixteen bytes as they were received.
    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        Guid(bytes)
    }

    /// The bytes as they were received.
    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }

    /// The same identifier with the groups in RFC 4122 order.
    pub fn to_uuid(&self) -> Uuid {
        let mut bytes = self.0;
        reorder_bytes(&mut bytes);
        Uuid::from_bytes(bytes)
    }
}

impl From<Guid> for Uuid {
    fn from(guid: Guid) -> Uuid {
        guid.to_uuid()
    }
}

impl From<Uuid> for Guid {
    fn from(uuid: Uuid) -> Guid {
        let mut bytes = *uuid.as_bytes();
        reorder_bytes(&mut bytes);
        Guid(bytes)
    }
}

impl FromStr for Guid {
    type Err = Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        Ok(Uuid::parse_str(s)?.into())
    }
}

impl fmt::Display for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_uuid().as_hyphenated())
    }
}

/// Copies a sixteen-byte `uniqueidentifier` payload without reordering.
pub fn decode_guid(buf: &[u8]) -> crate::Result<Guid> {
    let mut bytes = [0u8; 16];

    if buf.len() != bytes.len() {
        return Err(Error::Protocol(
            format!("guid: length of {} is invalid", buf.len()).into(),
        ));
    }

    bytes.copy_from_slice(buf);
    Ok(Guid(bytes))
}

/// UUIDs use network byte order (big endian) for the first 3 groups,
/// while GUIDs use native byte order (little endian).
///
/// https://github.com/microsoft/mssql-jdbc/blob/bec39dbba9544aef5f5f6a5495d5acf533efd6da/src/main/java/com/microsoft/sqlserver/jdbc/Util.java#L708-L730
fn reorder_bytes(bytes: &mut uuid::Bytes) {
    bytes.swap(0, 3);
    bytes.swap(1, 2);
    bytes.swap(4, 5);
    bytes.swap(6, 7);
}
