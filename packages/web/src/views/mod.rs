//! Route targets. Each page renders a `ui::views` body and maps its callbacks onto
//! [`Route`](crate::Route) values.

mod layout;
pub use layout::AppLayout;

mod login;
pub use login::{AuthCallback, Login};

mod register;
pub use register::Register;

mod dashboard;
pub use dashboard::Dashboard;

mod users;
pub use users::Users;

mod chamas;
pub use chamas::{ChamaDetail, CreateChama, DiscoverChamas, MyChamas};

mod transactions;
pub use transactions::Transactions;

mod not_found;
pub use not_found::NotFound;
