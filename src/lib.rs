pub mod configuration;
pub mod error;
pub mod menu_item;
pub mod script;
pub mod status_menu;
pub mod strings;
pub mod subscription;
pub mod summary;
pub mod tunnel;
pub mod tunnel_list;
pub mod tunnels_manager;

pub use error::{ActivationError, ConfigurationError, MenuError, ScriptError};
pub use menu_item::{MenuChange, MenuCommand, MenuItem, RowRendering};
pub use status_menu::{MenuHost, StatusMenu};
pub use strings::Strings;
pub use summary::SummaryProjector;
pub use tunnel::{Tunnel, TunnelKey, TunnelStatus};
pub use tunnel_list::{TunnelList, TunnelRow};
pub use tunnels_manager::{TunnelEvent, TunnelEvents, TunnelsManager};
