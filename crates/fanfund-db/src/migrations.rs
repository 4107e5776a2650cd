use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS influencers (
            id              INTEGER PRIMARY KEY AUTOINCREMENT,
            name            TEXT NOT NULL,
            bio             TEXT NOT NULL DEFAULT '',
            avatar_url      TEXT NOT NULL DEFAULT '',
            password_salt   TEXT NOT NULL DEFAULT '',
            password_hash   TEXT NOT NULL DEFAULT '',
            created_at      TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at      TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS donors (
            id              INTEGER PRIMARY KEY AUTOINCREMENT,
            name            TEXT NOT NULL,
            email           TEXT NOT NULL UNIQUE,
            password_salt   TEXT NOT NULL DEFAULT '',
            password_hash   TEXT NOT NULL DEFAULT '',
            created_at      TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at      TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS campaigns (
            id              INTEGER PRIMARY KEY AUTOINCREMENT,
            influencer_id   INTEGER NOT NULL
                            REFERENCES influencers(id) ON DELETE CASCADE,
            title           TEXT NOT NULL,
            description     TEXT NOT NULL DEFAULT '',
            goal_amount     REAL NOT NULL,
            current_amount  REAL NOT NULL DEFAULT 0,
            status          TEXT NOT NULL DEFAULT 'active'
                            CHECK (status IN ('active', 'completed', 'cancelled')),
            created_at      TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at      TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_campaigns_influencer
            ON campaigns(influencer_id);

        CREATE TABLE IF NOT EXISTS donations (
            id              INTEGER PRIMARY KEY AUTOINCREMENT,
            donor_id        INTEGER NOT NULL REFERENCES donors(id),
            campaign_id     INTEGER NOT NULL
                            REFERENCES campaigns(id) ON DELETE CASCADE,
            amount          REAL NOT NULL,
            message         TEXT NOT NULL DEFAULT '',
            created_at      TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_donations_campaign
            ON donations(campaign_id);
        CREATE INDEX IF NOT EXISTS idx_donations_donor
            ON donations(donor_id);
        ",
    )?;

    info!("Schema migrations applied");
    Ok(())
}
