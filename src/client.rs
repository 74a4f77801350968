pub mod api;
pub mod error;
pub mod forms;
pub mod session;
pub mod token_store;
pub mod view;

pub use api::{ConsoleApi, HttpConsoleApi};
pub use error::ClientError;
pub use forms::{UserSetupForm, VesselSetupForm};
pub use session::{ConsoleSession, DEFAULT_POLL_PERIOD, DbStatus, LOGOUT_NOTICE};
pub use token_store::{FileTokenStore, MemoryTokenStore, TOKEN_KEY, TokenStore};
pub use view::{View, ViewInputs, select_view};
