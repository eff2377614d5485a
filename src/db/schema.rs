pub(crate) const SCHEMA_V1: &str = r#"
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS users (
    id         INTEGER PRIMARY KEY AUTOINCREMENT,
    email      TEXT NOT NULL UNIQUE,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS months (
    id               INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id          INTEGER NOT NULL REFERENCES users(id),
    year             INTEGER NOT NULL,
    month            INTEGER NOT NULL,
    starting_balance TEXT NOT NULL DEFAULT '0',
    created_at       TEXT NOT NULL,
    updated_at       TEXT NOT NULL,
    deleted_at       TEXT
);

CREATE UNIQUE INDEX IF NOT EXISTS idx_months_user_year_month
    ON months(user_id, year, month) WHERE deleted_at IS NULL;

CREATE TABLE IF NOT EXISTS incomes (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id       INTEGER NOT NULL REFERENCES users(id),
    month_id      INTEGER NOT NULL REFERENCES months(id),
    date          TEXT NOT NULL,
    amount        TEXT NOT NULL,
    source_type   TEXT NOT NULL,
    custom_source TEXT,
    notes         TEXT,
    created_at    TEXT NOT NULL,
    updated_at    TEXT NOT NULL,
    deleted_at    TEXT
);

CREATE INDEX IF NOT EXISTS idx_incomes_user_month ON incomes(user_id, month_id);

CREATE TABLE IF NOT EXISTS expenses (
    id         INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id    INTEGER NOT NULL REFERENCES users(id),
    month_id   INTEGER NOT NULL REFERENCES months(id),
    date       TEXT NOT NULL,
    amount     TEXT NOT NULL,
    item_name  TEXT NOT NULL,
    category   TEXT NOT NULL,
    notes      TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    deleted_at TEXT
);

CREATE INDEX IF NOT EXISTS idx_expenses_user_month ON expenses(user_id, month_id);
CREATE INDEX IF NOT EXISTS idx_expenses_category ON expenses(category);

CREATE TABLE IF NOT EXISTS budgets (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id       INTEGER NOT NULL REFERENCES users(id),
    month_id      INTEGER NOT NULL REFERENCES months(id),
    category      TEXT NOT NULL,
    budget_amount TEXT NOT NULL,
    created_at    TEXT NOT NULL,
    updated_at    TEXT NOT NULL,
    deleted_at    TEXT
);

CREATE UNIQUE INDEX IF NOT EXISTS idx_budgets_user_month_category
    ON budgets(user_id, month_id, category) WHERE deleted_at IS NULL;

"#;

pub(crate) const CURRENT_VERSION: i32 = 1;

/// Migrations from version N to N+1.
/// Each entry is (from_version, sql).
pub(crate) const MIGRATIONS: &[(i32, &str)] = &[
    // Future migrations go here:
    // (1, "ALTER TABLE months ADD COLUMN currency TEXT NOT NULL DEFAULT 'HUF';"),
];
