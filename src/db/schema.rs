//! SQL DDL and queries for the application store, one dialect per backend.
//!
//! Every statement is `CREATE ... IF NOT EXISTS`, so the DDL can be replayed
//! against a store that is already initialized.

/// A table the application needs, with the columns it reads and writes.
#[derive(Debug, Clone, Copy)]
pub struct TableSpec {
    pub name: &'static str,
    pub columns: &'static [&'static str],
}

pub const REQUIRED_TABLES: &[TableSpec] = &[
    TableSpec {
        name: "constituencies",
        columns: &["id", "name", "state", "created_at"],
    },
    TableSpec {
        name: "voters",
        columns: &[
            "id",
            "name",
            "email",
            "password",
            "constituency",
            "is_verified",
            "created_at",
        ],
    },
    TableSpec {
        name: "admins",
        columns: &["id", "username", "password", "created_at"],
    },
    TableSpec {
        name: "candidates",
        columns: &[
            "id",
            "name",
            "party",
            "constituency",
            "photo_path",
            "symbol_path",
            "created_at",
        ],
    },
    TableSpec {
        name: "elections",
        columns: &[
            "id",
            "title",
            "description",
            "constituency",
            "start_time",
            "end_time",
            "status",
            "created_at",
        ],
    },
    TableSpec {
        name: "votes",
        columns: &["id", "voter_id", "election_id", "candidate_id", "voted_at"],
    },
    TableSpec {
        name: "audit_logs",
        columns: &[
            "id",
            "action",
            "user_type",
            "user_id",
            "ip_address",
            "user_agent",
            "details",
            "created_at",
        ],
    },
];

/// Andhra Pradesh parliamentary constituencies seeded on first run.
pub const CONSTITUENCY_STATE: &str = "Andhra Pradesh";
pub const CONSTITUENCIES: &[&str] = &[
    "Araku",
    "Srikakulam",
    "Vizianagaram",
    "Visakhapatnam",
    "Anakapalli",
    "Kakinada",
    "Amalapuram",
    "Rajahmundry",
    "Narasapuram",
    "Eluru",
    "Machilipatnam",
    "Vijayawada",
    "Guntur",
    "Narasaraopet",
    "Bapatla",
    "Ongole",
    "Nandyal",
    "Kurnool",
    "Anantapur",
    "Hindupur",
    "Kadapa",
    "Nellore",
    "Tirupati",
    "Rajampet",
    "Chittoor",
];

/// SQLite schema.
/// - `INTEGER PRIMARY KEY AUTOINCREMENT` ids
/// - timestamps stored via `CURRENT_TIMESTAMP` text
/// - `votes` holds one ballot per voter per election
pub const SQLITE_INIT: &str = r#"
CREATE TABLE IF NOT EXISTS constituencies (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT UNIQUE NOT NULL,
    state TEXT NOT NULL,
    created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
);

CREATE TABLE IF NOT EXISTS voters (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    email TEXT UNIQUE NOT NULL,
    password TEXT NOT NULL,
    constituency TEXT NOT NULL,
    is_verified BOOLEAN DEFAULT FALSE,
    created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
);

CREATE TABLE IF NOT EXISTS admins (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    username TEXT UNIQUE NOT NULL,
    password TEXT NOT NULL,
    created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
);

CREATE TABLE IF NOT EXISTS candidates (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    party TEXT NOT NULL,
    constituency TEXT NOT NULL,
    photo_path TEXT,
    symbol_path TEXT,
    created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
);

CREATE TABLE IF NOT EXISTS elections (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    description TEXT,
    constituency TEXT NOT NULL,
    start_time TIMESTAMP NOT NULL,
    end_time TIMESTAMP NOT NULL,
    status TEXT NOT NULL,
    created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
);

CREATE TABLE IF NOT EXISTS votes (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    voter_id INTEGER NOT NULL,
    election_id INTEGER NOT NULL,
    candidate_id INTEGER NOT NULL,
    voted_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
    UNIQUE (voter_id, election_id),
    FOREIGN KEY (voter_id) REFERENCES voters (id),
    FOREIGN KEY (election_id) REFERENCES elections (id),
    FOREIGN KEY (candidate_id) REFERENCES candidates (id)
);

CREATE TABLE IF NOT EXISTS audit_logs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    action TEXT NOT NULL,
    user_type TEXT NOT NULL,
    user_id INTEGER NOT NULL,
    ip_address TEXT,
    user_agent TEXT,
    details TEXT,
    created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
);

CREATE INDEX IF NOT EXISTS idx_votes_election_id ON votes(election_id);
CREATE INDEX IF NOT EXISTS idx_candidates_constituency ON candidates(constituency);
"#;

/// PostgreSQL schema, same shape with `SERIAL` ids and sized `VARCHAR`s.
pub const POSTGRES_INIT: &str = r#"
CREATE TABLE IF NOT EXISTS constituencies (
    id SERIAL PRIMARY KEY,
    name VARCHAR(255) UNIQUE NOT NULL,
    state VARCHAR(255) NOT NULL,
    created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
);

CREATE TABLE IF NOT EXISTS voters (
    id SERIAL PRIMARY KEY,
    name VARCHAR(255) NOT NULL,
    email VARCHAR(255) UNIQUE NOT NULL,
    password VARCHAR(255) NOT NULL,
    constituency VARCHAR(255) NOT NULL,
    is_verified BOOLEAN DEFAULT FALSE,
    created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
);

CREATE TABLE IF NOT EXISTS admins (
    id SERIAL PRIMARY KEY,
    username VARCHAR(255) UNIQUE NOT NULL,
    password VARCHAR(255) NOT NULL,
    created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
);

CREATE TABLE IF NOT EXISTS candidates (
    id SERIAL PRIMARY KEY,
    name VARCHAR(255) NOT NULL,
    party VARCHAR(255) NOT NULL,
    constituency VARCHAR(255) NOT NULL,
    photo_path TEXT,
    symbol_path TEXT,
    created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
);

CREATE TABLE IF NOT EXISTS elections (
    id SERIAL PRIMARY KEY,
    title VARCHAR(255) NOT NULL,
    description TEXT,
    constituency VARCHAR(255) NOT NULL,
    start_time TIMESTAMP NOT NULL,
    end_time TIMESTAMP NOT NULL,
    status VARCHAR(50) NOT NULL,
    created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
);

CREATE TABLE IF NOT EXISTS votes (
    id SERIAL PRIMARY KEY,
    voter_id INTEGER NOT NULL,
    election_id INTEGER NOT NULL,
    candidate_id INTEGER NOT NULL,
    voted_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
    UNIQUE (voter_id, election_id),
    FOREIGN KEY (voter_id) REFERENCES voters (id),
    FOREIGN KEY (election_id) REFERENCES elections (id),
    FOREIGN KEY (candidate_id) REFERENCES candidates (id)
);

CREATE TABLE IF NOT EXISTS audit_logs (
    id SERIAL PRIMARY KEY,
    action VARCHAR(255) NOT NULL,
    user_type VARCHAR(50) NOT NULL,
    user_id INTEGER NOT NULL,
    ip_address VARCHAR(45),
    user_agent TEXT,
    details TEXT,
    created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
);

CREATE INDEX IF NOT EXISTS idx_votes_election_id ON votes(election_id);
CREATE INDEX IF NOT EXISTS idx_candidates_constituency ON candidates(constituency);
"#;

/// Backend-specific statement text. Placeholders differ (`?` vs `$n`).
#[derive(Debug)]
pub struct Dialect {
    pub init: &'static str,
    pub table_exists: &'static str,
    pub table_columns: &'static str,
    pub insert_constituency: &'static str,
    pub count_admins_named: &'static str,
    pub insert_admin: &'static str,
    pub list_constituencies: &'static str,
}

pub const SQLITE: Dialect = Dialect {
    init: SQLITE_INIT,
    table_exists: "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?",
    table_columns: "SELECT name FROM pragma_table_info(?)",
    insert_constituency: "INSERT INTO constituencies (name, state) VALUES (?, ?) ON CONFLICT (name) DO NOTHING",
    count_admins_named: "SELECT COUNT(*) FROM admins WHERE username = ?",
    insert_admin: "INSERT INTO admins (username, password) VALUES (?, ?)",
    list_constituencies: "SELECT name, state FROM constituencies ORDER BY name",
};

pub const POSTGRES: Dialect = Dialect {
    init: POSTGRES_INIT,
    table_exists: "SELECT COUNT(*) FROM information_schema.tables \
                   WHERE table_schema = current_schema() AND table_name = $1",
    table_columns: "SELECT column_name::text FROM information_schema.columns \
                    WHERE table_schema = current_schema() AND table_name = $1",
    insert_constituency: "INSERT INTO constituencies (name, state) VALUES ($1, $2) ON CONFLICT (name) DO NOTHING",
    count_admins_named: "SELECT COUNT(*) FROM admins WHERE username = $1",
    insert_admin: "INSERT INTO admins (username, password) VALUES ($1, $2)",
    list_constituencies: "SELECT name::text, state::text FROM constituencies ORDER BY name",
};
