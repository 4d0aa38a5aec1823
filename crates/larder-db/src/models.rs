/// Database row types. These map directly to SQLite rows.
/// Distinct from larder-types wire models to keep the DB layer independent.

pub struct UserRow {
    pub id: i64,
    pub name: String,
    pub password: String,
    pub is_online: bool,
}

pub struct PresenceRow {
    pub name: String,
    pub is_online: bool,
}

pub struct RecipeRow {
    pub id: i64,
    pub op: String,
    pub title: String,
    pub instructions: String,
    /// JSON array of URLs
    pub image_urls: String,
    pub time: String,
}

/// Outcome of inserting a user whose name may already exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserInsert {
    Created(i64),
    /// The UNIQUE constraint on `name` refused the row.
    NameTaken,
}
