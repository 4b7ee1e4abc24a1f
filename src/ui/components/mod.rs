pub mod input_bar;
pub mod message_list;
pub mod settings_panel;

pub use input_bar::InputBar;
pub use message_list::MessageList;
pub use settings_panel::{SettingsDraft, SettingsPanel};
