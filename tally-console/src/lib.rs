//! Tally Console - 门店后台管理控制台
//!
//! Resource collections fetched from the shop backend, list views with
//! search/filter/sort/CSV export, CRUD dispatch with notices, the login
//! session and route guard, and persisted local state.

pub mod config;
pub mod console;
pub mod controller;
pub mod guard;
pub mod logging;
pub mod notice;
pub mod refs;
pub mod session;
pub mod state;
pub mod store;
pub mod tracker;
pub mod view;

pub use config::ConsoleConfig;
pub use console::Console;
pub use controller::ResourceController;
pub use guard::{Access, Route, RouteGuard};
pub use notice::{Notice, NoticeBoard, NoticeLevel};
pub use session::{AuthState, Session};
pub use state::{Cart, PersistedState, StateStore};
pub use store::{Collection, FetchOutcome, RequestStatus, RequestTicket, StoreError};
pub use view::{Direction, Filter, ListQuery, ListView, SortSpec};
