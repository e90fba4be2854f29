// Local workbook: every sheet lives in memory behind a lock and, when a
// path is set, the whole workbook is rewritten to a JSON file after each
// change. A change only becomes visible once it has been written, so memory
// and file never disagree. Used for offline use and in tests.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use log::debug;

use super::{StoreError, Workbook, Worksheet};

type Sheets = BTreeMap<String, Vec<Vec<String>>>;

struct Inner {
    sheets: RwLock<Sheets>,
    path: Option<PathBuf>,
}

#[derive(Clone)]
pub struct LocalWorkbook {
    inner: Arc<Inner>,
}

impl LocalWorkbook {
    /// Workbook that is never written to disk.
    pub fn in_memory() -> Self {
        LocalWorkbook {
            inner: Arc::new(Inner {
                sheets: RwLock::new(Sheets::new()),
                path: None,
            }),
        }
    }

    /// Open (or start) a workbook persisted at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let sheets = if path.exists() {
            let data = fs::read_to_string(&path)?;
            serde_json::from_str(&data)?
        } else {
            Sheets::new()
        };
        debug!("opened local workbook {} ({} sheets)", path.display(), sheets.len());
        Ok(LocalWorkbook {
            inner: Arc::new(Inner {
                sheets: RwLock::new(sheets),
                path: Some(path),
            }),
        })
    }

    pub fn sheet_titles(&self) -> Result<Vec<String>, StoreError> {
        let sheets = self
            .inner
            .sheets
            .read()
            .map_err(|_| StoreError::LockPoisoned("read"))?;
        Ok(sheets.keys().cloned().collect())
    }

    fn persist(&self, sheets: &Sheets) -> Result<(), StoreError> {
        if let Some(path) = &self.inner.path {
            if let Some(dir) = path.parent() {
                if !dir.as_os_str().is_empty() {
                    fs::create_dir_all(dir)?;
                }
            }
            fs::write(path, serde_json::to_string_pretty(sheets)?)?;
        }
        Ok(())
    }

    fn with_sheet<T>(
        &self,
        title: &str,
        f: impl FnOnce(&mut Vec<Vec<String>>) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut sheets = self
            .inner
            .sheets
            .write()
            .map_err(|_| StoreError::LockPoisoned("write"))?;
        let mut next = sheets.clone();
        let rows = next
            .get_mut(title)
            .ok_or_else(|| StoreError::SheetNotFound(title.to_string()))?;
        let out = f(rows)?;
        self.persist(&next)?;
        *sheets = next;
        Ok(out)
    }
}

impl Workbook for LocalWorkbook {
    type Sheet = LocalSheet;

    fn worksheet(&self, title: &str) -> Result<LocalSheet, StoreError> {
        let sheets = self
            .inner
            .sheets
            .read()
            .map_err(|_| StoreError::LockPoisoned("read"))?;
        if !sheets.contains_key(title) {
            return Err(StoreError::SheetNotFound(title.to_string()));
        }
        Ok(LocalSheet {
            book: self.clone(),
            title: title.to_string(),
        })
    }

    fn add_worksheet(&self, title: &str, _rows: usize, _cols: usize) -> Result<LocalSheet, StoreError> {
        let mut sheets = self
            .inner
            .sheets
            .write()
            .map_err(|_| StoreError::LockPoisoned("write"))?;
        if sheets.contains_key(title) {
            return Err(StoreError::DuplicateSheet(title.to_string()));
        }
        let mut next = sheets.clone();
        next.insert(title.to_string(), Vec::new());
        self.persist(&next)?;
        *sheets = next;
        Ok(LocalSheet {
            book: self.clone(),
            title: title.to_string(),
        })
    }
}

/// Handle to one sheet of a [`LocalWorkbook`].
#[derive(Clone)]
pub struct LocalSheet {
    book: LocalWorkbook,
    title: String,
}

impl Worksheet for LocalSheet {
    fn title(&self) -> &str {
        &self.title
    }

    fn values(&self) -> Result<Vec<Vec<String>>, StoreError> {
        let sheets = self
            .book
            .inner
            .sheets
            .read()
            .map_err(|_| StoreError::LockPoisoned("read"))?;
        sheets
            .get(&self.title)
            .cloned()
            .ok_or_else(|| StoreError::SheetNotFound(self.title.clone()))
    }

    fn append_row(&self, row: &[String]) -> Result<(), StoreError> {
        self.book.with_sheet(&self.title, |rows| {
            rows.push(row.to_vec());
            Ok(())
        })
    }

    fn update_cell(&self, row: usize, col: usize, value: &str) -> Result<(), StoreError> {
        if row == 0 || col == 0 {
            return Err(StoreError::RowOutOfRange(row));
        }
        self.book.with_sheet(&self.title, |rows| {
            if rows.len() < row {
                rows.resize_with(row, Vec::new);
            }
            let cells = &mut rows[row - 1];
            if cells.len() < col {
                cells.resize(col, String::new());
            }
            cells[col - 1] = value.to_string();
            Ok(())
        })
    }

    fn delete_row(&self, row: usize) -> Result<(), StoreError> {
        self.book.with_sheet(&self.title, |rows| {
            if row == 0 || row > rows.len() {
                return Err(StoreError::RowOutOfRange(row));
            }
            rows.remove(row - 1);
            Ok(())
        })
    }
}
