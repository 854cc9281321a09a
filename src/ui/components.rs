mod confirm_dialog;
mod table;
mod text_input;

pub use confirm_dialog::{ConfirmDialog, ConfirmEvent};
pub use table::{ColumnDef, Table, TableEvent, TableRow};
pub use text_input::TextInput;
