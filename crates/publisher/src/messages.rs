//! User-facing notification texts.

pub const SETTINGS_NOT_SET: &str =
    "You need to set your Airtable API Key and Base ID in the settings tab.";
pub const CREATED_NOTE: &str = "Your note URL has been copied to the clipboard";
pub const NOTE_UPDATED: &str = "Your updated note url has been copied to your clipboard";
pub const NOTE_NOT_FOUND: &str = "Could not find your note";
pub const DELETED_NOTE: &str = "Your note has been deleted";
pub const CREATING_ERROR: &str = "There has been a problem publishing your note";
pub const UPDATING_ERROR: &str = "There has been a problem updating your note";
pub const DELETING_ERROR: &str = "There has been a problem deleting your note";
pub const LISTING_ERROR: &str = "There has been a problem listing your notes";
pub const NO_PUBLISHED_NOTES: &str = "You have no published notes";
pub const UNPUBLISHABLE_PATH: &str = "This note's name has no letters or digits to build a link from";
