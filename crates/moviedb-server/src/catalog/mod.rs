//! Read-side queries over the catalog views

pub mod columns;
pub mod insights;
pub mod lookalike;
pub mod query;

pub use columns::{ColumnAllowList, View};
pub use insights::{
    best_profit_per_worker, genre_distribution, loyal_crew_members, multi_role_actors, GenreShare,
    Lookup, LoyalCrewMember, LoyalCrewQuery, MultiRoleActor, ProfitPerWorker,
};
pub use lookalike::{find_lookalikes, Lookalike, Lookalikes};
pub use query::{parse_limit, ViewQuery};
