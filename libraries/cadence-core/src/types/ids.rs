/// ID types for Cadence entities
///
/// The CMS assigns numeric primary keys, so every id wraps an `i64`.
use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! numeric_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Wrap a raw CMS id
            pub const fn new(id: i64) -> Self {
                Self(id)
            }

            /// Get the raw CMS id
            pub const fn as_i64(self) -> i64 {
                self.0
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

numeric_id!(
    /// Song identifier
    TrackId
);

numeric_id!(
    /// Playlist identifier
    PlaylistId
);

numeric_id!(
    /// User account identifier
    UserId
);

numeric_id!(
    /// Album identifier
    AlbumId
);

numeric_id!(
    /// Author (artist) identifier
    AuthorId
);
