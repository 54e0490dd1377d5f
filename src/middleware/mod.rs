pub mod current_user;
pub mod flash;

pub use current_user::{get_current_user, CurrentUser};
pub use flash::{push_flash, take_flash, FlashLevel, FlashMessage, Layout};
