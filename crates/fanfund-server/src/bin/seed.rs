//! Resets the database and loads demo data. Donations go through the
//! ledger so seeded campaign totals match their donation rows.

use std::path::PathBuf;

use tracing::info;

use fanfund_auth::password;
use fanfund_db::Database;
use fanfund_db::ledger::NewDonation;

const DEMO_PASSWORD: &str = "password123";

fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();

    let db_path = std::env::var("FANFUND_DB_PATH").unwrap_or_else(|_| "fanfund.db".into());
    let db = Database::open(&PathBuf::from(&db_path))?;

    db.reset()?;
    info!("Database reset");

    let influencers = [
        (
            "Alex Gaming",
            "Professional gamer and streamer",
            "https://api.dicebear.com/7.x/avataaars/svg?seed=alex",
        ),
        (
            "Sarah Tech",
            "Tech reviewer and educator",
            "https://api.dicebear.com/7.x/avataaars/svg?seed=sarah",
        ),
        (
            "Mike Fitness",
            "Fitness coach and motivator",
            "https://api.dicebear.com/7.x/avataaars/svg?seed=mike",
        ),
    ];
    let mut influencer_ids = Vec::new();
    for (name, bio, avatar_url) in influencers {
        let credential = password::hash_password(DEMO_PASSWORD)?;
        influencer_ids.push(db.create_influencer(name, bio, avatar_url, &credential)?);
    }

    let campaigns = [
        (0, "New Gaming Setup", "Help me upgrade my streaming rig", 5000.0),
        (0, "Charity Gaming Marathon", "24 hour stream for the children's hospital", 10000.0),
        (1, "Tech Lab Equipment", "Building a proper testing lab", 8000.0),
        (2, "Home Gym Build", "A dedicated space for workout content", 3000.0),
    ];
    let mut campaign_ids = Vec::new();
    for (owner, title, description, goal_amount) in campaigns {
        campaign_ids.push(db.create_campaign(
            influencer_ids[owner],
            title,
            description,
            goal_amount,
        )?);
    }

    let donors = [
        ("John Smith", "john@example.com"),
        ("Emily Johnson", "emily@example.com"),
        ("David Wilson", "david@example.com"),
        ("Lisa Brown", "lisa@example.com"),
        ("Chris Lee", "chris@example.com"),
    ];
    let mut donor_ids = Vec::new();
    for (name, email) in donors {
        let credential = password::hash_password(DEMO_PASSWORD)?;
        donor_ids.push(db.create_donor(name, email, &credential)?);
    }

    let donations = [
        (0, 0, 50.0, "Love your streams!"),
        (1, 0, 100.0, "Keep up the great work!"),
        (2, 1, 200.0, "Great cause!"),
        (3, 2, 75.0, "Your reviews are amazing!"),
        (4, 3, 25.0, "Thanks for the motivation!"),
        (0, 2, 150.0, "Excited for the new lab!"),
        (1, 3, 50.0, "Great tutorials!"),
    ];
    for (donor, campaign, amount, message) in donations {
        db.record_donation(&NewDonation {
            donor_id: donor_ids[donor],
            campaign_id: campaign_ids[campaign],
            amount,
            message,
        })?;
    }

    info!(
        "Seeded {} influencers, {} campaigns, {} donors, {} donations (demo password: {})",
        influencer_ids.len(),
        campaign_ids.len(),
        donor_ids.len(),
        donations.len(),
        DEMO_PASSWORD
    );
    Ok(())
}
