//! Async editing session
//!
//! A [`Session`] owns one [`Spreadsheet`] and adds what an interactive front
//! end needs around it: file import and export off the async executor, a
//! loading flag, and a slot holding the last import/export failure.
//!
//! Synchronous cell and sheet operations go straight through to the store via
//! `Deref`:
//!
//! ```rust
//! use gridpilot::Session;
//!
//! let mut session = Session::new();
//! session.set_cell_value("A1", "Product", None).unwrap();
//! assert!(!session.is_loading());
//! ```

use std::ops::{Deref, DerefMut};
use std::path::{Component, Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use gridpilot_core::{Spreadsheet, SpreadsheetData};

use crate::codec;
use crate::error::{CodecError, CodecResult, Error, Result};
use crate::options::{ExportOptions, ImportOptions};

/// Raises the loading flag for as long as it lives
struct LoadingGuard {
    flag: Arc<AtomicBool>,
}

impl LoadingGuard {
    fn start(flag: &Arc<AtomicBool>) -> Self {
        flag.store(true, Ordering::SeqCst);
        Self {
            flag: Arc::clone(flag),
        }
    }
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

/// A spreadsheet plus import/export state
///
/// Imports replace the whole store on success and leave it untouched on
/// failure. `import_*` take `&mut self`, so two imports on one session can
/// never interleave.
#[derive(Debug, Default)]
pub struct Session {
    spreadsheet: Spreadsheet,
    loading: Arc<AtomicBool>,
    last_error: Option<String>,
}

impl Session {
    /// Start a session with a single empty `Sheet1`
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a session around an existing spreadsheet
    pub fn with_spreadsheet(spreadsheet: Spreadsheet) -> Self {
        Self {
            spreadsheet,
            ..Self::default()
        }
    }

    pub fn spreadsheet(&self) -> &Spreadsheet {
        &self.spreadsheet
    }

    pub fn spreadsheet_mut(&mut self) -> &mut Spreadsheet {
        &mut self.spreadsheet
    }

    pub fn into_spreadsheet(self) -> Spreadsheet {
        self.spreadsheet
    }

    /// Whether an import or export is in flight
    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst)
    }

    /// Shared handle to the loading flag, for observers on other tasks
    pub fn loading_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.loading)
    }

    /// Message of the last failed import or export, cleared when the next one
    /// starts
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    // === Import ===

    /// Import a workbook from bytes, replacing the store
    ///
    /// The container is parsed on a blocking worker thread. On success the
    /// first imported sheet becomes active.
    pub async fn import_bytes(&mut self, bytes: Vec<u8>, options: &ImportOptions) -> Result<()> {
        self.import_bytes_with(bytes, options, codec::decode).await
    }

    async fn import_bytes_with<D>(
        &mut self,
        bytes: Vec<u8>,
        options: &ImportOptions,
        decode: D,
    ) -> Result<()>
    where
        D: FnOnce(&[u8], &ImportOptions) -> CodecResult<SpreadsheetData> + Send + 'static,
    {
        self.last_error = None;
        let _loading = LoadingGuard::start(&self.loading);

        let result = self.import_inner(bytes, options, decode).await;
        self.settle(result)
    }

    /// Import a workbook from a file, replacing the store
    pub async fn import_file<P: AsRef<Path>>(
        &mut self,
        path: P,
        options: &ImportOptions,
    ) -> Result<()> {
        self.last_error = None;
        let _loading = LoadingGuard::start(&self.loading);

        let path = path.as_ref();
        tracing::debug!("reading {}", path.display());
        let result = match tokio::fs::read(path).await {
            Ok(bytes) => self.import_inner(bytes, options, codec::decode).await,
            Err(e) => Err(Error::Import(e.into())),
        };
        self.settle(result)
    }

    async fn import_inner<D>(
        &mut self,
        bytes: Vec<u8>,
        options: &ImportOptions,
        decode: D,
    ) -> Result<()>
    where
        D: FnOnce(&[u8], &ImportOptions) -> CodecResult<SpreadsheetData> + Send + 'static,
    {
        tracing::info!(
            "importing {} bytes as {}",
            bytes.len(),
            options.format.extension()
        );

        let data = decode_in_background(bytes, options.clone(), decode).await?;
        if data.is_empty() {
            return Err(Error::Import(CodecError::NoSheets));
        }

        let sheets = data.sheet_count();
        self.spreadsheet.replace(data)?;
        tracing::info!(
            "imported {sheets} sheet(s), active sheet '{}'",
            self.spreadsheet.active_sheet()
        );
        Ok(())
    }

    // === Export ===

    /// Serialize the store to bytes
    pub fn export_bytes(&mut self, options: &ExportOptions) -> Result<Vec<u8>> {
        self.last_error = None;
        let _loading = LoadingGuard::start(&self.loading);

        let result = codec::encode(self.spreadsheet.data(), options).map_err(Error::Export);
        self.settle(result)
    }

    /// Write the store into `dir` under `options.file_name()`, returning the
    /// written path
    ///
    /// The file name must be a single plain path component; anything that
    /// would land outside `dir` fails with [`CodecError::InvalidFileName`].
    /// Serialization runs on a blocking worker against a snapshot, so edits
    /// made after this call starts are not included.
    pub async fn export_file<P: AsRef<Path>>(
        &mut self,
        dir: P,
        options: &ExportOptions,
    ) -> Result<PathBuf> {
        self.last_error = None;
        let _loading = LoadingGuard::start(&self.loading);

        let result = match export_path(dir.as_ref(), options.file_name()) {
            Ok(path) => {
                let snapshot = self.spreadsheet.snapshot();
                match encode_in_background(snapshot, options.clone()).await {
                    Ok(bytes) => tokio::fs::write(&path, bytes)
                        .await
                        .map(|()| path)
                        .map_err(|e| Error::Export(e.into())),
                    Err(e) => Err(e),
                }
            }
            Err(e) => Err(Error::Export(e)),
        };

        if let Ok(path) = &result {
            tracing::info!("exported spreadsheet to {}", path.display());
        }
        self.settle(result)
    }

    /// Record a failure in the error slot
    fn settle<T>(&mut self, result: Result<T>) -> Result<T> {
        if let Err(e) = &result {
            tracing::warn!("{e}");
            self.last_error = Some(e.to_string());
        }
        result
    }
}

impl Deref for Session {
    type Target = Spreadsheet;

    fn deref(&self) -> &Spreadsheet {
        &self.spreadsheet
    }
}

impl DerefMut for Session {
    fn deref_mut(&mut self) -> &mut Spreadsheet {
        &mut self.spreadsheet
    }
}

impl From<Spreadsheet> for Session {
    fn from(spreadsheet: Spreadsheet) -> Self {
        Self::with_spreadsheet(spreadsheet)
    }
}

/// `dir` joined with a file name that cannot leave it
fn export_path(dir: &Path, file_name: &str) -> CodecResult<PathBuf> {
    let mut components = Path::new(file_name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(name)), None) => Ok(dir.join(name)),
        _ => Err(CodecError::InvalidFileName(file_name.to_string())),
    }
}

async fn decode_in_background<D>(
    bytes: Vec<u8>,
    options: ImportOptions,
    decode: D,
) -> Result<SpreadsheetData>
where
    D: FnOnce(&[u8], &ImportOptions) -> CodecResult<SpreadsheetData> + Send + 'static,
{
    tokio::task::spawn_blocking(move || decode(&bytes, &options))
        .await
        .map_err(|e| CodecError::Task(e.to_string()))
        .and_then(|decoded| decoded)
        .map_err(Error::Import)
}

async fn encode_in_background(data: SpreadsheetData, options: ExportOptions) -> Result<Vec<u8>> {
    tokio::task::spawn_blocking(move || codec::encode(&data, &options))
        .await
        .map_err(|e| CodecError::Task(e.to_string()))
        .and_then(|encoded| encoded)
        .map_err(Error::Export)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loading_guard_raises_and_clears_flag() {
        let session = Session::new();
        let flag = session.loading_flag();

        {
            let _guard = LoadingGuard::start(&flag);
            assert!(session.is_loading());
        }
        assert!(!session.is_loading());
    }

    #[test]
    fn test_deref_reaches_store() {
        let mut session = Session::new();
        session.add_sheet("Totals").unwrap();
        assert_eq!(session.sheet_names(), vec!["Sheet1", "Totals"]);
        assert_eq!(session.spreadsheet().active_sheet(), "Totals");
    }

    #[test]
    fn test_export_path_stays_in_dir() {
        let dir = Path::new("out");
        assert_eq!(export_path(dir, "book.xlsx").unwrap(), dir.join("book.xlsx"));

        for name in ["../book.xlsx", "nested/book.xlsx", "/tmp/book.xlsx", "..", ""] {
            assert!(
                matches!(export_path(dir, name), Err(CodecError::InvalidFileName(_))),
                "{name:?} should be rejected"
            );
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_loading_flag_raised_while_import_is_in_flight() {
        let mut source = Session::new();
        source.set_cell_value("A1", "Product", None).unwrap();
        let bytes = source.export_bytes(&ExportOptions::default()).unwrap();

        let mut session = Session::new();
        let flag = session.loading_flag();
        let (release, released) = std::sync::mpsc::channel::<()>();

        // Observes the flag from another task, then lets the decoder finish
        let observer = tokio::spawn(async move {
            for _ in 0..5_000 {
                if flag.load(Ordering::SeqCst) {
                    release.send(()).unwrap();
                    return true;
                }
                tokio::time::sleep(std::time::Duration::from_millis(1)).await;
            }
            false
        });

        session
            .import_bytes_with(bytes, &ImportOptions::default(), move |bytes, options| {
                released
                    .recv_timeout(std::time::Duration::from_secs(10))
                    .expect("observer never saw the loading flag");
                codec::decode(bytes, options)
            })
            .await
            .unwrap();

        assert!(observer.await.unwrap());
        assert!(!session.is_loading());
        assert_eq!(session.sheet_names(), vec!["Sheet1"]);
        assert_eq!(
            session.get_cell("A1").unwrap().unwrap().value,
            gridpilot_core::CellValue::string("Product")
        );
    }

    #[test]
    fn test_export_failure_fills_error_slot() {
        let mut session = Session::new();
        let result = session.export_bytes(&ExportOptions::default());

        assert!(matches!(result, Err(Error::Export(_))));
        assert_eq!(
            session.last_error(),
            Some("Failed to export spreadsheet: Workbook is empty")
        );
        assert!(!session.is_loading());
    }
}
