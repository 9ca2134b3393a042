/// Maximum number of watchlists a store may hold, the default one included
pub const MAX_WATCHLISTS: usize = 20;

/// Maximum number of items in a single watchlist
pub const MAX_ITEMS_PER_WATCHLIST: usize = 100;

/// Watchlist name bounds, in characters, measured after trimming
pub const MIN_NAME_LENGTH: usize = 1;
pub const MAX_NAME_LENGTH: usize = 50;

/// Maximum length of an item note, in characters, measured after trimming
pub const MAX_NOTE_LENGTH: usize = 200;

/// Name given to the watchlist created on first use
pub const DEFAULT_WATCHLIST_NAME: &str = "My Watchlist";

/// Fallback name for an imported watchlist whose name is blank
pub const IMPORTED_WATCHLIST_NAME: &str = "Imported Watchlist";

/// Current layout version of the persisted watchlist record
pub const CURRENT_SCHEMA_VERSION: u32 = 2;

/// Version of the JSON export envelope
pub const EXPORT_FORMAT_VERSION: u32 = 1;

/// Expiry horizon used in placeholder copy only. The remote sets the real `expires_at`.
pub const DEFAULT_SHARE_EXPIRY_DAYS: u32 = 7;
