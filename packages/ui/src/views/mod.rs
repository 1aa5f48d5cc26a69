//! Page bodies shared by the platform packages.
//!
//! Views take navigation callbacks instead of routes, so each platform maps them onto
//! its own router.

mod modal_overlay;
pub use modal_overlay::ModalOverlay;

mod dashboard;
pub use dashboard::{DashboardStats, DashboardView};

mod user_management;
pub use user_management::UserManagementView;

mod chama_list;
pub use chama_list::{ChamaListView, ChamaLists, ChamaTab};

mod chama_discovery;
pub use chama_discovery::ChamaDiscoveryView;

mod create_chama;
pub use create_chama::CreateChamaView;

mod chama_detail;
pub use chama_detail::{Access, ChamaDetailView};

mod transactions;
pub use transactions::TransactionsView;
