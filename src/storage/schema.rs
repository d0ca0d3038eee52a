//! Database schema definitions for the local content store

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Service and user accounts
CREATE TABLE IF NOT EXISTS accounts (
    id TEXT PRIMARY KEY,
    email TEXT NOT NULL UNIQUE,
    display_name TEXT NOT NULL,
    email_confirmed INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL
);

-- Public profile attached to an account
CREATE TABLE IF NOT EXISTS profiles (
    id TEXT PRIMARY KEY REFERENCES accounts(id),
    username TEXT NOT NULL UNIQUE,
    height INTEGER,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_profiles_username ON profiles(username);

-- Published posts
CREATE TABLE IF NOT EXISTS posts (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL REFERENCES profiles(id),
    image_url TEXT NOT NULL,
    publisher_height INTEGER NOT NULL,
    publisher_size TEXT NOT NULL,
    description TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_posts_user ON posts(user_id);

-- One row per size offered for a post
CREATE TABLE IF NOT EXISTS post_variants (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    post_id TEXT NOT NULL REFERENCES posts(id),
    brand TEXT NOT NULL,
    product_name TEXT NOT NULL,
    size TEXT NOT NULL,
    category TEXT NOT NULL,
    description TEXT NOT NULL,
    purchase_link TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_post_variants_post ON post_variants(post_id);

-- Uploaded objects
CREATE TABLE IF NOT EXISTS storage_objects (
    bucket TEXT NOT NULL,
    key TEXT NOT NULL,
    content_type TEXT NOT NULL,
    bytes BLOB NOT NULL,
    created_at TEXT NOT NULL,
    PRIMARY KEY (bucket, key)
);
"#;

/// Initializes the database schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
