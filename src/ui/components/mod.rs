mod command_overlay;
mod input;
mod key_result;
mod search_input;

pub use command_overlay::draw_command_overlay;
pub use input::{InputResult, TextInput};
pub use key_result::KeyResult;
pub use search_input::{SearchEvent, SearchInput};
