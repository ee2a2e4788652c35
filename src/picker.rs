use std::path::{Path, PathBuf};

#[derive(Debug, Clone, thiserror::Error)]
pub enum FolderPickerError {
    #[error("dialog window closed without selecting a folder")]
    DialogClosed,
}

/// Opens a folder dialog, starting from `start_folder` when known.
pub fn pick_folder(title: &str, start_folder: Option<&Path>) -> Result<PathBuf, FolderPickerError> {
    let mut dialog = rfd::FileDialog::new().set_title(title);
    if let Some(start_folder) = start_folder.filter(|f| f.is_dir()) {
        dialog = dialog.set_directory(start_folder);
    }
    let picked = dialog.pick_folder().ok_or(FolderPickerError::DialogClosed)?;
    log::info!("Picked folder: {picked:?}");
    Ok(picked)
}
