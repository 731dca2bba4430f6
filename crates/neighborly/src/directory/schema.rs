//! `SQLite` schema definitions for the directory store.
//!
//! This module contains the SQL statements for creating and managing
//! the directory database schema.

/// SQL statement to create the persons table.
pub const CREATE_PERSONS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS persons (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    deleted INTEGER NOT NULL DEFAULT 0
)
";

/// SQL statement to create the groups table.
pub const CREATE_GROUPS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS groups (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    deleted INTEGER NOT NULL DEFAULT 0
)
";

/// SQL statement to create the group membership table.
pub const CREATE_GROUP_MEMBERS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS group_members (
    person_id INTEGER NOT NULL,
    group_id INTEGER NOT NULL,
    role TEXT NOT NULL DEFAULT 'member',
    PRIMARY KEY (person_id, group_id)
)
";

/// SQL statement to create the contacts table.
///
/// Latitude and longitude are nullable: they stay NULL until the geocoding
/// collaborator resolves the address text.
pub const CREATE_CONTACTS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS contacts (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    owner_kind TEXT NOT NULL,
    owner_id INTEGER NOT NULL,
    kind TEXT NOT NULL,
    address TEXT NOT NULL,
    latitude REAL,
    longitude REAL,
    visibility TEXT NOT NULL DEFAULT 'public',
    deleted INTEGER NOT NULL DEFAULT 0
)
";

/// SQL statement to create an index on contact ownership for lookups.
pub const CREATE_CONTACT_OWNER_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_contacts_owner ON contacts(owner_kind, owner_id)
";

/// SQL statement to create an index on membership by person.
pub const CREATE_MEMBER_PERSON_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_group_members_person ON group_members(person_id)
";

/// SQL statement to create the metadata table for storing key-value pairs.
pub const CREATE_METADATA_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS metadata (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
)
";

/// All schema creation statements in order.
pub const SCHEMA_STATEMENTS: &[&str] = &[
    CREATE_PERSONS_TABLE,
    CREATE_GROUPS_TABLE,
    CREATE_GROUP_MEMBERS_TABLE,
    CREATE_CONTACTS_TABLE,
    CREATE_CONTACT_OWNER_INDEX,
    CREATE_MEMBER_PERSON_INDEX,
    CREATE_METADATA_TABLE,
];
