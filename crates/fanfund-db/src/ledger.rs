//! Transactional donation writes.
//!
//! A donation row and its campaign running total must move together.
//! Both methods here wrap their statements in a single SQLite
//! transaction, so a failure at any step leaves the database exactly
//! as it was.

use anyhow::Result;
use rusqlite::{OptionalExtension, params};
use thiserror::Error;
use tracing::info;

use crate::Database;
use crate::models::DonationRow;
use crate::queries::{DONATION_SELECT, map_donation};

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Campaign not found")]
    CampaignNotFound,
    #[error("Donor not found")]
    DonorNotFound,
    #[error("Donation not found")]
    DonationNotFound,
    #[error(transparent)]
    Db(#[from] anyhow::Error),
}

/// A donation about to be recorded.
pub struct NewDonation<'a> {
    pub donor_id: i64,
    pub campaign_id: i64,
    pub amount: f64,
    pub message: &'a str,
}

impl Database {
    /// Inserts a donation and adds its amount to the campaign running
    /// total. Referenced rows are checked inside the transaction so the
    /// caller gets a precise error instead of a raw constraint failure.
    pub fn record_donation(&self, donation: &NewDonation) -> Result<DonationRow, LedgerError> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            let campaign_exists: bool = tx.query_row(
                "SELECT EXISTS(SELECT 1 FROM campaigns WHERE id = ?1)",
                [donation.campaign_id],
                |row| row.get(0),
            )?;
            if !campaign_exists {
                return Ok(Err(LedgerError::CampaignNotFound));
            }
            let donor_exists: bool = tx.query_row(
                "SELECT EXISTS(SELECT 1 FROM donors WHERE id = ?1)",
                [donation.donor_id],
                |row| row.get(0),
            )?;
            if !donor_exists {
                return Ok(Err(LedgerError::DonorNotFound));
            }

            tx.execute(
                "INSERT INTO donations (donor_id, campaign_id, amount, message)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    donation.donor_id,
                    donation.campaign_id,
                    donation.amount,
                    donation.message
                ],
            )?;
            let id = tx.last_insert_rowid();

            tx.execute(
                "UPDATE campaigns
                 SET current_amount = current_amount + ?1, updated_at = datetime('now')
                 WHERE id = ?2",
                params![donation.amount, donation.campaign_id],
            )?;

            let sql = format!("{} WHERE d.id = ?1", DONATION_SELECT);
            let row = tx.query_row(&sql, [id], map_donation)?;

            tx.commit()?;
            info!(
                "Recorded donation {} of {} to campaign {}",
                id, donation.amount, donation.campaign_id
            );
            Ok(Ok(row))
        })?
    }

    /// Deletes a donation and subtracts its amount from the campaign
    /// running total, in one transaction.
    pub fn reverse_donation(&self, id: i64) -> Result<(), LedgerError> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            let target = tx
                .query_row(
                    "SELECT campaign_id, amount FROM donations WHERE id = ?1",
                    [id],
                    |row| Ok((row.get::<_, i64>(0)?, row.get::<_, f64>(1)?)),
                )
                .optional()?;
            let Some((campaign_id, amount)) = target else {
                return Ok(Err(LedgerError::DonationNotFound));
            };

            tx.execute(
                "UPDATE campaigns
                 SET current_amount = current_amount - ?1, updated_at = datetime('now')
                 WHERE id = ?2",
                params![amount, campaign_id],
            )?;
            tx.execute("DELETE FROM donations WHERE id = ?1", [id])?;

            tx.commit()?;
            info!(
                "Reversed donation {} of {} from campaign {}",
                id, amount, campaign_id
            );
            Ok(Ok(()))
        })?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fanfund_types::Credential;
    use std::sync::Arc;

    fn open_test_db() -> (Database, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open(&dir.path().join("test.db")).unwrap();
        (db, dir)
    }

    fn credential() -> Credential {
        Credential {
            salt: "salt".into(),
            hash: "hash".into(),
        }
    }

    /// One influencer with one campaign, one donor. Returns (campaign, donor).
    fn seed(db: &Database) -> (i64, i64) {
        let influencer = db
            .create_influencer("Alex Gaming", "", "", &credential())
            .unwrap();
        let campaign = db
            .create_campaign(influencer, "New Gaming Setup", "", 5000.0)
            .unwrap();
        let donor = db
            .create_donor("John Smith", "john@example.com", &credential())
            .unwrap();
        (campaign, donor)
    }

    #[test]
    fn recording_updates_the_campaign_total() {
        let (db, _dir) = open_test_db();
        let (campaign, donor) = seed(&db);

        let row = db
            .record_donation(&NewDonation {
                donor_id: donor,
                campaign_id: campaign,
                amount: 50.0,
                message: "Love your streams!",
            })
            .unwrap();

        assert_eq!(row.amount, 50.0);
        assert_eq!(row.message, "Love your streams!");
        assert_eq!(row.donor_name, "John Smith");
        assert_eq!(row.campaign_title, "New Gaming Setup");

        let total = db.get_campaign(campaign).unwrap().unwrap().current_amount;
        assert_eq!(total, 50.0);

        db.record_donation(&NewDonation {
            donor_id: donor,
            campaign_id: campaign,
            amount: 100.0,
            message: "",
        })
        .unwrap();
        let total = db.get_campaign(campaign).unwrap().unwrap().current_amount;
        assert_eq!(total, 150.0);
    }

    #[test]
    fn missing_references_leave_no_trace() {
        let (db, _dir) = open_test_db();
        let (campaign, donor) = seed(&db);

        let err = db
            .record_donation(&NewDonation {
                donor_id: donor,
                campaign_id: 9999,
                amount: 50.0,
                message: "",
            })
            .unwrap_err();
        assert!(matches!(err, LedgerError::CampaignNotFound));

        let err = db
            .record_donation(&NewDonation {
                donor_id: 9999,
                campaign_id: campaign,
                amount: 50.0,
                message: "",
            })
            .unwrap_err();
        assert!(matches!(err, LedgerError::DonorNotFound));

        let donations = db
            .list_donations(&crate::queries::DonationFilter::default())
            .unwrap();
        assert!(donations.is_empty());
        let total = db.get_campaign(campaign).unwrap().unwrap().current_amount;
        assert_eq!(total, 0.0);
    }

    #[test]
    fn reversal_restores_the_previous_total() {
        let (db, _dir) = open_test_db();
        let (campaign, donor) = seed(&db);

        let kept = db
            .record_donation(&NewDonation {
                donor_id: donor,
                campaign_id: campaign,
                amount: 100.0,
                message: "",
            })
            .unwrap();
        let reversed = db
            .record_donation(&NewDonation {
                donor_id: donor,
                campaign_id: campaign,
                amount: 25.0,
                message: "",
            })
            .unwrap();

        db.reverse_donation(reversed.id).unwrap();

        assert!(db.get_donation(reversed.id).unwrap().is_none());
        assert!(db.get_donation(kept.id).unwrap().is_some());
        let total = db.get_campaign(campaign).unwrap().unwrap().current_amount;
        assert_eq!(total, 100.0);
    }

    #[test]
    fn reversing_a_missing_donation_fails() {
        let (db, _dir) = open_test_db();
        seed(&db);

        let err = db.reverse_donation(9999).unwrap_err();
        assert!(matches!(err, LedgerError::DonationNotFound));
    }

    #[test]
    fn concurrent_donations_all_land() {
        let (db, _dir) = open_test_db();
        let (campaign, donor) = seed(&db);
        let db = Arc::new(db);

        let threads: Vec<_> = (0..4)
            .map(|_| {
                let db = Arc::clone(&db);
                std::thread::spawn(move || {
                    for _ in 0..25 {
                        db.record_donation(&NewDonation {
                            donor_id: donor,
                            campaign_id: campaign,
                            amount: 10.0,
                            message: "",
                        })
                        .unwrap();
                    }
                })
            })
            .collect();
        for handle in threads {
            handle.join().unwrap();
        }

        let donations = db
            .list_donations(&crate::queries::DonationFilter {
                campaign_id: Some(campaign),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(donations.len(), 100);
        let total = db.get_campaign(campaign).unwrap().unwrap().current_amount;
        assert_eq!(total, 1000.0);
    }
}
