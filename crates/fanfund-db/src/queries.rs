use anyhow::Result;
use rusqlite::{Connection, OptionalExtension, params};

use fanfund_types::Credential;

use crate::Database;
use crate::migrations;
use crate::models::{CampaignRow, DonationRow, DonorRow, InfluencerRow};

/// Outcome of deleting a row that other rows may still reference.
pub enum DeleteOutcome {
    Deleted,
    Missing,
    /// Referencing rows exist; nothing was deleted.
    Blocked,
}

/// Filters for donation listings. All set fields are ANDed together.
#[derive(Default)]
pub struct DonationFilter {
    pub campaign_id: Option<i64>,
    pub donor_id: Option<i64>,
    /// Restricts to donations whose campaign belongs to this influencer.
    pub campaign_owner: Option<i64>,
}

/// Aggregate numbers for the statistics endpoint.
pub struct StatsTotals {
    pub influencers: i64,
    pub campaigns: i64,
    pub donors: i64,
    pub donations: i64,
    pub donation_sum: f64,
    pub donation_avg: f64,
}

pub struct StatusCounts {
    pub active: i64,
    pub completed: i64,
    pub cancelled: i64,
}

const INFLUENCER_SELECT: &str =
    "SELECT id, name, bio, avatar_url, created_at, updated_at FROM influencers";

const DONOR_SELECT: &str = "SELECT id, name, email, created_at, updated_at FROM donors";

const CAMPAIGN_SELECT: &str = "
    SELECT c.id, c.influencer_id, i.name, c.title, c.description,
           c.goal_amount, c.current_amount, c.status, c.created_at, c.updated_at
    FROM campaigns c
    JOIN influencers i ON c.influencer_id = i.id";

pub(crate) const DONATION_SELECT: &str = "
    SELECT d.id, d.donor_id, dn.name, d.campaign_id, c.title, c.influencer_id,
           d.amount, d.message, d.created_at
    FROM donations d
    JOIN donors dn ON d.donor_id = dn.id
    JOIN campaigns c ON d.campaign_id = c.id";

impl Database {
    // -- Influencers --

    pub fn create_influencer(
        &self,
        name: &str,
        bio: &str,
        avatar_url: &str,
        credential: &Credential,
    ) -> Result<i64> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO influencers (name, bio, avatar_url, password_salt, password_hash)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![name, bio, avatar_url, credential.salt, credential.hash],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    pub fn list_influencers(&self) -> Result<Vec<InfluencerRow>> {
        self.with_conn(|conn| {
            let sql = format!("{} ORDER BY created_at DESC, id DESC", INFLUENCER_SELECT);
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([], map_influencer)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn get_influencer(&self, id: i64) -> Result<Option<InfluencerRow>> {
        self.with_conn(|conn| {
            let sql = format!("{} WHERE id = ?1", INFLUENCER_SELECT);
            let row = conn.query_row(&sql, [id], map_influencer).optional()?;
            Ok(row)
        })
    }

    pub fn update_influencer(
        &self,
        id: i64,
        name: Option<&str>,
        bio: Option<&str>,
        avatar_url: Option<&str>,
    ) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let changed = conn.execute(
                "UPDATE influencers
                 SET name = COALESCE(?1, name),
                     bio = COALESCE(?2, bio),
                     avatar_url = COALESCE(?3, avatar_url),
                     updated_at = datetime('now')
                 WHERE id = ?4",
                params![name, bio, avatar_url, id],
            )?;
            Ok(changed > 0)
        })
    }

    pub fn delete_influencer(&self, id: i64) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let changed = conn.execute("DELETE FROM influencers WHERE id = ?1", [id])?;
            Ok(changed > 0)
        })
    }

    /// Credential access is deliberately separate from the row queries above:
    /// nothing that serializes an influencer can ever see these columns.
    pub fn get_influencer_credential(&self, id: i64) -> Result<Option<Credential>> {
        self.with_conn(|conn| {
            let row = conn
                .query_row(
                    "SELECT password_salt, password_hash FROM influencers WHERE id = ?1",
                    [id],
                    map_credential,
                )
                .optional()?;
            Ok(row)
        })
    }

    pub fn update_influencer_credential(&self, id: i64, credential: &Credential) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let changed = conn.execute(
                "UPDATE influencers
                 SET password_salt = ?1, password_hash = ?2, updated_at = datetime('now')
                 WHERE id = ?3",
                params![credential.salt, credential.hash, id],
            )?;
            Ok(changed > 0)
        })
    }

    // -- Donors --

    pub fn create_donor(&self, name: &str, email: &str, credential: &Credential) -> Result<i64> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO donors (name, email, password_salt, password_hash)
                 VALUES (?1, ?2, ?3, ?4)",
                params![name, email, credential.salt, credential.hash],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    pub fn list_donors(&self) -> Result<Vec<DonorRow>> {
        self.with_conn(|conn| {
            let sql = format!("{} ORDER BY created_at DESC, id DESC", DONOR_SELECT);
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([], map_donor)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn get_donor(&self, id: i64) -> Result<Option<DonorRow>> {
        self.with_conn(|conn| {
            let sql = format!("{} WHERE id = ?1", DONOR_SELECT);
            let row = conn.query_row(&sql, [id], map_donor).optional()?;
            Ok(row)
        })
    }

    pub fn get_donor_by_email(&self, email: &str) -> Result<Option<DonorRow>> {
        self.with_conn(|conn| {
            let sql = format!("{} WHERE email = ?1", DONOR_SELECT);
            let row = conn.query_row(&sql, [email], map_donor).optional()?;
            Ok(row)
        })
    }

    pub fn update_donor(&self, id: i64, name: Option<&str>, email: Option<&str>) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let changed = conn.execute(
                "UPDATE donors
                 SET name = COALESCE(?1, name),
                     email = COALESCE(?2, email),
                     updated_at = datetime('now')
                 WHERE id = ?3",
                params![name, email, id],
            )?;
            Ok(changed > 0)
        })
    }

    /// Refuses to delete a donor that still has donations: cascading here
    /// would silently break campaign running totals.
    pub fn delete_donor(&self, id: i64) -> Result<DeleteOutcome> {
        self.with_conn_mut(|conn| {
            let donations: i64 = conn.query_row(
                "SELECT COUNT(*) FROM donations WHERE donor_id = ?1",
                [id],
                |row| row.get(0),
            )?;
            if donations > 0 {
                return Ok(DeleteOutcome::Blocked);
            }

            let changed = conn.execute("DELETE FROM donors WHERE id = ?1", [id])?;
            Ok(if changed > 0 {
                DeleteOutcome::Deleted
            } else {
                DeleteOutcome::Missing
            })
        })
    }

    pub fn get_donor_credential(&self, id: i64) -> Result<Option<Credential>> {
        self.with_conn(|conn| {
            let row = conn
                .query_row(
                    "SELECT password_salt, password_hash FROM donors WHERE id = ?1",
                    [id],
                    map_credential,
                )
                .optional()?;
            Ok(row)
        })
    }

    pub fn update_donor_credential(&self, id: i64, credential: &Credential) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let changed = conn.execute(
                "UPDATE donors
                 SET password_salt = ?1, password_hash = ?2, updated_at = datetime('now')
                 WHERE id = ?3",
                params![credential.salt, credential.hash, id],
            )?;
            Ok(changed > 0)
        })
    }

    // -- Campaigns --

    pub fn create_campaign(
        &self,
        influencer_id: i64,
        title: &str,
        description: &str,
        goal_amount: f64,
    ) -> Result<i64> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO campaigns (influencer_id, title, description, goal_amount)
                 VALUES (?1, ?2, ?3, ?4)",
                params![influencer_id, title, description, goal_amount],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    pub fn list_campaigns(
        &self,
        influencer_id: Option<i64>,
        status: Option<&str>,
    ) -> Result<Vec<CampaignRow>> {
        self.with_conn(|conn| query_campaigns(conn, influencer_id, status))
    }

    pub fn get_campaign(&self, id: i64) -> Result<Option<CampaignRow>> {
        self.with_conn(|conn| {
            let sql = format!("{} WHERE c.id = ?1", CAMPAIGN_SELECT);
            let row = conn.query_row(&sql, [id], map_campaign).optional()?;
            Ok(row)
        })
    }

    pub fn update_campaign(
        &self,
        id: i64,
        title: Option<&str>,
        description: Option<&str>,
        goal_amount: Option<f64>,
        status: Option<&str>,
    ) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let changed = conn.execute(
                "UPDATE campaigns
                 SET title = COALESCE(?1, title),
                     description = COALESCE(?2, description),
                     goal_amount = COALESCE(?3, goal_amount),
                     status = COALESCE(?4, status),
                     updated_at = datetime('now')
                 WHERE id = ?5",
                params![title, description, goal_amount, status, id],
            )?;
            Ok(changed > 0)
        })
    }

    pub fn delete_campaign(&self, id: i64) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let changed = conn.execute("DELETE FROM campaigns WHERE id = ?1", [id])?;
            Ok(changed > 0)
        })
    }

    pub fn top_campaigns(&self, limit: u32) -> Result<Vec<CampaignRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "{} ORDER BY c.current_amount DESC, c.id ASC LIMIT ?1",
                CAMPAIGN_SELECT
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([limit], map_campaign)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    // -- Donations (reads; writes go through the ledger) --

    pub fn list_donations(&self, filter: &DonationFilter) -> Result<Vec<DonationRow>> {
        self.with_conn(|conn| query_donations(conn, filter))
    }

    pub fn get_donation(&self, id: i64) -> Result<Option<DonationRow>> {
        self.with_conn(|conn| {
            let sql = format!("{} WHERE d.id = ?1", DONATION_SELECT);
            let row = conn.query_row(&sql, [id], map_donation).optional()?;
            Ok(row)
        })
    }

    pub fn recent_donations(&self, limit: u32) -> Result<Vec<DonationRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "{} ORDER BY d.created_at DESC, d.id DESC LIMIT ?1",
                DONATION_SELECT
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([limit], map_donation)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    // -- Statistics --

    pub fn stats_totals(&self) -> Result<StatsTotals> {
        self.with_conn(|conn| {
            let influencers: i64 =
                conn.query_row("SELECT COUNT(*) FROM influencers", [], |row| row.get(0))?;
            let campaigns: i64 =
                conn.query_row("SELECT COUNT(*) FROM campaigns", [], |row| row.get(0))?;
            let donors: i64 =
                conn.query_row("SELECT COUNT(*) FROM donors", [], |row| row.get(0))?;
            let donations: i64 =
                conn.query_row("SELECT COUNT(*) FROM donations", [], |row| row.get(0))?;
            let (donation_sum, donation_avg): (f64, f64) = conn.query_row(
                "SELECT COALESCE(SUM(amount), 0), COALESCE(AVG(amount), 0) FROM donations",
                [],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )?;

            Ok(StatsTotals {
                influencers,
                campaigns,
                donors,
                donations,
                donation_sum,
                donation_avg,
            })
        })
    }

    pub fn campaign_status_counts(&self) -> Result<StatusCounts> {
        self.with_conn(|conn| {
            let mut counts = StatusCounts {
                active: 0,
                completed: 0,
                cancelled: 0,
            };

            let mut stmt = conn.prepare("SELECT status, COUNT(*) FROM campaigns GROUP BY status")?;
            let rows = stmt.query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
            })?;
            for row in rows {
                let (status, count) = row?;
                match status.as_str() {
                    "active" => counts.active = count,
                    "completed" => counts.completed = count,
                    "cancelled" => counts.cancelled = count,
                    _ => {}
                }
            }

            Ok(counts)
        })
    }

    // -- Maintenance --

    /// Drops and recreates all tables. Used by the seed tool.
    pub fn reset(&self) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute_batch(
                "DROP TABLE IF EXISTS donations;
                 DROP TABLE IF EXISTS campaigns;
                 DROP TABLE IF EXISTS donors;
                 DROP TABLE IF EXISTS influencers;",
            )?;
            migrations::run(conn)?;
            Ok(())
        })
    }
}

fn query_campaigns(
    conn: &Connection,
    influencer_id: Option<i64>,
    status: Option<&str>,
) -> Result<Vec<CampaignRow>> {
    let mut sql = String::from(CAMPAIGN_SELECT);
    let mut clauses: Vec<&str> = Vec::new();
    let mut params: Vec<&dyn rusqlite::types::ToSql> = Vec::new();

    if influencer_id.is_some() {
        clauses.push("c.influencer_id = ?");
        params.push(&influencer_id);
    }
    if status.is_some() {
        clauses.push("c.status = ?");
        params.push(&status);
    }
    if !clauses.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&clauses.join(" AND "));
    }
    sql.push_str(" ORDER BY c.created_at DESC, c.id DESC");

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params.as_slice(), map_campaign)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

fn query_donations(conn: &Connection, filter: &DonationFilter) -> Result<Vec<DonationRow>> {
    let mut sql = String::from(DONATION_SELECT);
    let mut clauses: Vec<&str> = Vec::new();
    let mut params: Vec<&dyn rusqlite::types::ToSql> = Vec::new();

    if filter.campaign_id.is_some() {
        clauses.push("d.campaign_id = ?");
        params.push(&filter.campaign_id);
    }
    if filter.donor_id.is_some() {
        clauses.push("d.donor_id = ?");
        params.push(&filter.donor_id);
    }
    if filter.campaign_owner.is_some() {
        clauses.push("c.influencer_id = ?");
        params.push(&filter.campaign_owner);
    }
    if !clauses.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&clauses.join(" AND "));
    }
    sql.push_str(" ORDER BY d.created_at DESC, d.id DESC");

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params.as_slice(), map_donation)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

fn map_influencer(row: &rusqlite::Row) -> rusqlite::Result<InfluencerRow> {
    Ok(InfluencerRow {
        id: row.get(0)?,
        name: row.get(1)?,
        bio: row.get(2)?,
        avatar_url: row.get(3)?,
        created_at: row.get(4)?,
        updated_at: row.get(5)?,
    })
}

fn map_donor(row: &rusqlite::Row) -> rusqlite::Result<DonorRow> {
    Ok(DonorRow {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        created_at: row.get(3)?,
        updated_at: row.get(4)?,
    })
}

fn map_campaign(row: &rusqlite::Row) -> rusqlite::Result<CampaignRow> {
    Ok(CampaignRow {
        id: row.get(0)?,
        influencer_id: row.get(1)?,
        influencer_name: row.get(2)?,
        title: row.get(3)?,
        description: row.get(4)?,
        goal_amount: row.get(5)?,
        current_amount: row.get(6)?,
        status: row.get(7)?,
        created_at: row.get(8)?,
        updated_at: row.get(9)?,
    })
}

pub(crate) fn map_donation(row: &rusqlite::Row) -> rusqlite::Result<DonationRow> {
    Ok(DonationRow {
        id: row.get(0)?,
        donor_id: row.get(1)?,
        donor_name: row.get(2)?,
        campaign_id: row.get(3)?,
        campaign_title: row.get(4)?,
        campaign_influencer_id: row.get(5)?,
        amount: row.get(6)?,
        message: row.get(7)?,
        created_at: row.get(8)?,
    })
}

fn map_credential(row: &rusqlite::Row) -> rusqlite::Result<Credential> {
    Ok(Credential {
        salt: row.get(0)?,
        hash: row.get(1)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::NewDonation;

    fn test_credential(tag: &str) -> Credential {
        Credential {
            salt: format!("{}-salt", tag),
            hash: format!("{}-hash", tag),
        }
    }

    fn open_test_db() -> (Database, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open(&dir.path().join("test.db")).unwrap();
        (db, dir)
    }

    fn seed_influencer(db: &Database, name: &str) -> i64 {
        db.create_influencer(name, "bio", "", &test_credential(name))
            .unwrap()
    }

    fn seed_donor(db: &Database, name: &str, email: &str) -> i64 {
        db.create_donor(name, email, &test_credential(name)).unwrap()
    }

    #[test]
    fn influencer_crud_round_trip() {
        let (db, _dir) = open_test_db();
        let id = seed_influencer(&db, "Alex Gaming");

        let row = db.get_influencer(id).unwrap().unwrap();
        assert_eq!(row.name, "Alex Gaming");
        assert_eq!(row.bio, "bio");

        assert!(db.update_influencer(id, None, Some("new bio"), None).unwrap());
        let row = db.get_influencer(id).unwrap().unwrap();
        assert_eq!(row.name, "Alex Gaming");
        assert_eq!(row.bio, "new bio");

        assert!(db.delete_influencer(id).unwrap());
        assert!(db.get_influencer(id).unwrap().is_none());
        assert!(!db.delete_influencer(id).unwrap());
    }

    #[test]
    fn credentials_live_behind_dedicated_queries() {
        let (db, _dir) = open_test_db();
        let id = seed_influencer(&db, "Alex Gaming");

        let credential = db.get_influencer_credential(id).unwrap().unwrap();
        assert_eq!(credential.salt, "Alex Gaming-salt");
        assert_eq!(credential.hash, "Alex Gaming-hash");

        let fresh = test_credential("rotated");
        assert!(db.update_influencer_credential(id, &fresh).unwrap());
        assert_eq!(db.get_influencer_credential(id).unwrap().unwrap(), fresh);

        assert!(db.get_influencer_credential(9999).unwrap().is_none());
    }

    #[test]
    fn donor_emails_are_unique() {
        let (db, _dir) = open_test_db();
        seed_donor(&db, "John Smith", "john@example.com");

        assert!(
            db.create_donor("Imposter", "john@example.com", &test_credential("x"))
                .is_err()
        );

        let by_email = db.get_donor_by_email("john@example.com").unwrap().unwrap();
        assert_eq!(by_email.name, "John Smith");
        assert!(db.get_donor_by_email("nobody@example.com").unwrap().is_none());
    }

    #[test]
    fn donor_delete_is_blocked_while_donations_exist() {
        let (db, _dir) = open_test_db();
        let influencer = seed_influencer(&db, "Alex Gaming");
        let campaign = db
            .create_campaign(influencer, "New Gaming Setup", "", 5000.0)
            .unwrap();
        let donor = seed_donor(&db, "John Smith", "john@example.com");

        let donation = db
            .record_donation(&NewDonation {
                donor_id: donor,
                campaign_id: campaign,
                amount: 50.0,
                message: "",
            })
            .unwrap();

        assert!(matches!(
            db.delete_donor(donor).unwrap(),
            DeleteOutcome::Blocked
        ));

        db.reverse_donation(donation.id).unwrap();
        assert!(matches!(
            db.delete_donor(donor).unwrap(),
            DeleteOutcome::Deleted
        ));
        assert!(matches!(
            db.delete_donor(donor).unwrap(),
            DeleteOutcome::Missing
        ));
    }

    #[test]
    fn deleting_an_influencer_cascades_to_campaigns() {
        let (db, _dir) = open_test_db();
        let influencer = seed_influencer(&db, "Alex Gaming");
        let campaign = db
            .create_campaign(influencer, "New Gaming Setup", "", 5000.0)
            .unwrap();

        assert!(db.delete_influencer(influencer).unwrap());
        assert!(db.get_campaign(campaign).unwrap().is_none());
    }

    #[test]
    fn campaign_list_filters_compose() {
        let (db, _dir) = open_test_db();
        let alex = seed_influencer(&db, "Alex Gaming");
        let sarah = seed_influencer(&db, "Sarah Tech");
        let a = db.create_campaign(alex, "New Gaming Setup", "", 5000.0).unwrap();
        let b = db.create_campaign(alex, "Charity Marathon", "", 10000.0).unwrap();
        let c = db.create_campaign(sarah, "Tech Lab", "", 8000.0).unwrap();

        assert!(db
            .update_campaign(b, None, None, None, Some("completed"))
            .unwrap());

        assert_eq!(db.list_campaigns(None, None).unwrap().len(), 3);
        assert_eq!(db.list_campaigns(Some(alex), None).unwrap().len(), 2);

        let completed = db.list_campaigns(None, Some("completed")).unwrap();
        assert_eq!(completed.len(), 1);
        assert_eq!(completed[0].id, b);

        let alex_active = db.list_campaigns(Some(alex), Some("active")).unwrap();
        assert_eq!(alex_active.len(), 1);
        assert_eq!(alex_active[0].id, a);

        let campaign = db.get_campaign(c).unwrap().unwrap();
        assert_eq!(campaign.influencer_name, "Sarah Tech");
    }

    #[test]
    fn donation_list_scopes_by_owner_and_donor() {
        let (db, _dir) = open_test_db();
        let alex = seed_influencer(&db, "Alex Gaming");
        let sarah = seed_influencer(&db, "Sarah Tech");
        let gaming = db.create_campaign(alex, "New Gaming Setup", "", 5000.0).unwrap();
        let lab = db.create_campaign(sarah, "Tech Lab", "", 8000.0).unwrap();
        let john = seed_donor(&db, "John Smith", "john@example.com");
        let emily = seed_donor(&db, "Emily Johnson", "emily@example.com");

        for (donor_id, campaign_id, amount) in
            [(john, gaming, 50.0), (emily, gaming, 100.0), (john, lab, 75.0)]
        {
            db.record_donation(&NewDonation {
                donor_id,
                campaign_id,
                amount,
                message: "",
            })
            .unwrap();
        }

        assert_eq!(db.list_donations(&DonationFilter::default()).unwrap().len(), 3);

        let johns = db
            .list_donations(&DonationFilter {
                donor_id: Some(john),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(johns.len(), 2);
        assert!(johns.iter().all(|d| d.donor_id == john));

        let alexs = db
            .list_donations(&DonationFilter {
                campaign_owner: Some(alex),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(alexs.len(), 2);
        assert!(alexs.iter().all(|d| d.campaign_id == gaming));

        let johns_on_gaming = db
            .list_donations(&DonationFilter {
                campaign_id: Some(gaming),
                donor_id: Some(john),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(johns_on_gaming.len(), 1);
        assert_eq!(johns_on_gaming[0].amount, 50.0);
        assert_eq!(johns_on_gaming[0].donor_name, "John Smith");
        assert_eq!(johns_on_gaming[0].campaign_title, "New Gaming Setup");
    }

    #[test]
    fn stats_cover_empty_and_populated_databases() {
        let (db, _dir) = open_test_db();

        let totals = db.stats_totals().unwrap();
        assert_eq!(totals.donations, 0);
        assert_eq!(totals.donation_sum, 0.0);
        assert_eq!(totals.donation_avg, 0.0);

        let alex = seed_influencer(&db, "Alex Gaming");
        let gaming = db.create_campaign(alex, "New Gaming Setup", "", 5000.0).unwrap();
        let lab = db.create_campaign(alex, "Tech Lab", "", 8000.0).unwrap();
        db.update_campaign(lab, None, None, None, Some("cancelled"))
            .unwrap();
        let john = seed_donor(&db, "John Smith", "john@example.com");
        for amount in [50.0, 150.0] {
            db.record_donation(&NewDonation {
                donor_id: john,
                campaign_id: gaming,
                amount,
                message: "",
            })
            .unwrap();
        }

        let totals = db.stats_totals().unwrap();
        assert_eq!(totals.influencers, 1);
        assert_eq!(totals.campaigns, 2);
        assert_eq!(totals.donors, 1);
        assert_eq!(totals.donations, 2);
        assert_eq!(totals.donation_sum, 200.0);
        assert_eq!(totals.donation_avg, 100.0);

        let counts = db.campaign_status_counts().unwrap();
        assert_eq!(counts.active, 1);
        assert_eq!(counts.cancelled, 1);
        assert_eq!(counts.completed, 0);

        let top = db.top_campaigns(5).unwrap();
        assert_eq!(top[0].id, gaming);
        assert_eq!(top[0].current_amount, 200.0);
    }

    #[test]
    fn reset_wipes_all_tables() {
        let (db, _dir) = open_test_db();
        let alex = seed_influencer(&db, "Alex Gaming");
        db.create_campaign(alex, "New Gaming Setup", "", 5000.0).unwrap();

        db.reset().unwrap();

        assert!(db.list_influencers().unwrap().is_empty());
        assert!(db.list_campaigns(None, None).unwrap().is_empty());
        let totals = db.stats_totals().unwrap();
        assert_eq!(totals.campaigns, 0);
    }
}
