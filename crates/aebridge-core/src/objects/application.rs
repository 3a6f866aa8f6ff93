use tracing::info;

use super::{misc::File, project::CloseOptions, require, Project};
use crate::{
    enums::GPU_ACCEL_TYPE,
    error::Result,
    proxy::{remote_object, Remote},
};

/// Menu command id of Edit > Duplicate
pub const COMMAND_DUPLICATE: i64 = 2080;
/// Menu command id of File > Increment and Save
pub const COMMAND_SAVE_INCREMENTAL: i64 = 3088;

remote_object! {
    /// The host's global `app` object
    Application => "Application"
}

impl Application {
    /// The currently open project
    pub fn project(&self) -> Result<Project> {
        require(self.get_object("project")?, "the open project")
    }

    pub fn version(&self) -> Result<String> {
        self.get("version")
    }

    pub fn build_name(&self) -> Result<String> {
        self.get("buildName")
    }

    pub fn language(&self) -> Result<String> {
        self.get("isoLanguage")
    }

    /// GPU acceleration types the current machine supports, as labels
    pub fn available_gpu_accel_types(&self) -> Result<Vec<&'static str>> {
        let codes: Vec<i64> = self.get("availableGPUAccelTypes")?;
        codes.into_iter().map(|code| GPU_ACCEL_TYPE.label(code)).collect()
    }

    /// Open a project file, or show the open dialog when `path` is `None`.
    ///
    /// `save` decides what happens to the current project first: `None`
    /// leaves it to the host, otherwise it is closed saving or discarding
    /// changes. Returns `None` if the user cancelled the dialog.
    pub fn open(&self, path: Option<&str>, save: Option<bool>) -> Result<Option<Project>> {
        self.close_current(save)?;
        match path {
            Some(path) => {
                let file = File::from_path(self.handle().session(), path)?;
                info!(path, "opening project");
                self.invoke_object("open", &[&file])
            }
            None => self.invoke_object("open", &[]),
        }
    }

    /// Create a new empty project. `save` behaves as in [`Application::open`].
    pub fn new_project(&self, save: Option<bool>) -> Result<Option<Project>> {
        self.close_current(save)?;
        self.invoke_object("newProject", &[])
    }

    fn close_current(&self, save: Option<bool>) -> Result<()> {
        if let Some(save) = save {
            self.project()?.close(CloseOptions::from_save(Some(save)))?;
        }
        Ok(())
    }

    /// Run a menu command by its numeric id
    pub fn execute_command(&self, command: i64) -> Result<()> {
        self.invoke::<Option<bool>>("executeCommand", &[&command])?;
        Ok(())
    }

    /// Look up a menu command id from its menu text
    pub fn find_menu_command_id(&self, name: &str) -> Result<i64> {
        self.invoke("findMenuCommandId", &[&name])
    }

    pub fn begin_undo_group(&self, name: &str) -> Result<()> {
        self.invoke::<Option<bool>>("beginUndoGroup", &[&name])?;
        Ok(())
    }

    pub fn end_undo_group(&self) -> Result<()> {
        self.invoke::<Option<bool>>("endUndoGroup", &[])?;
        Ok(())
    }

    pub fn purge_all_caches(&self) -> Result<bool> {
        self.invoke("purge", &[&crate::codec::Raw("PurgeTarget.ALL_CACHES")])
    }
}
