mod bid;
mod decision;
mod feedback;
mod identity;
mod tender;

pub use bid::{BidDao, BidStore, CreateBidError};
pub use decision::{DecisionDao, SqlDecisionStore};
pub use feedback::FeedbackDao;
pub use identity::IdentityDao;
pub use tender::{TenderDao, TenderStore};

use tf_persistence::DbExecutor;

pub fn init(db: &DbExecutor) -> anyhow::Result<()> {
    db.apply_migration(crate::db::migrations::run_with_output)
}
