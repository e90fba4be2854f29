// Library root
// -----------
// The binary (`main.rs`) wires configuration and logging, opens the
// configured workbook and hands it to the interactive UI.
//
// Module responsibilities:
// - `store`: spreadsheet row store traits plus the Google Sheets and
//   local JSON backends.
// - `book`, `validate`: the book record and input validation rules.
// - `catalog`: add/remove/update/search over one user's sheet.
// - `auth`: user accounts (users sheet + argon2 hashes) and sessions.
// - `lookup`: Google Books ISBN lookup.
// - `paging`, `table`: paginated, box-drawn listings.
// - `config`: command-line and environment configuration.
// - `ui`: terminal flows built on `dialoguer`.
pub mod auth;
pub mod book;
pub mod catalog;
pub mod config;
pub mod lookup;
pub mod paging;
pub mod store;
pub mod table;
pub mod ui;
pub mod validate;
