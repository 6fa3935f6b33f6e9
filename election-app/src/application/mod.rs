mod admin_dashboard;
mod manage_polls;
mod poll_queries;

pub use admin_dashboard::AdminDashboard;
pub use manage_polls::ManagePolls;
pub use poll_queries::PollQueries;
