pub mod settings_struct;

pub use settings_struct::{
    update_settings, update_settings_from_content, update_settings_from_file, Settings, GLOBAL,
};
