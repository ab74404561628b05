pub const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id TEXT PRIMARY KEY,
    username TEXT NOT NULL UNIQUE,
    email TEXT,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS features (
    id TEXT PRIMARY KEY,
    title TEXT NOT NULL CHECK (length(title) BETWEEN 1 AND 200),
    description TEXT,
    author_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

-- One vote per (feature, voter); the key doubles as the ledger index
CREATE TABLE IF NOT EXISTS votes (
    feature_id TEXT NOT NULL REFERENCES features(id) ON DELETE CASCADE,
    voter_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    created_at TEXT NOT NULL,
    PRIMARY KEY (feature_id, voter_id)
) WITHOUT ROWID;

CREATE INDEX IF NOT EXISTS idx_features_author ON features(author_id);
CREATE INDEX IF NOT EXISTS idx_features_created ON features(created_at);
CREATE INDEX IF NOT EXISTS idx_votes_voter ON votes(voter_id);
"#;
