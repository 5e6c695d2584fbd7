//! Session record database schema.

/// SQL to create the session records table.
pub const CREATE_SESSION_RECORDS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS session_records (
    session_id       TEXT PRIMARY KEY,
    recorded_at      TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    condition        VARCHAR(255) NOT NULL,
    chat_history     JSONB NOT NULL,
    survey_knowledge SMALLINT NOT NULL CHECK (survey_knowledge BETWEEN 1 AND 5),
    survey_empathy   SMALLINT NOT NULL CHECK (survey_empathy BETWEEN 1 AND 5),
    survey_comments  TEXT NOT NULL,
    script_version   VARCHAR(64) NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_session_records_condition
    ON session_records (condition);
";
