use tracing::debug;

use super::{
    application::COMMAND_SAVE_INCREMENTAL,
    item::{items_of_type, FolderItem, FootageItem, Item, ItemCollection, ItemLike, TimeSpan},
    layer::Layer,
    misc::{File, Folder, ImportOptions, RenderQueue},
    require,
};
use crate::{
    codec::{FromValue, Raw, ToExtend},
    collection::{host_index, RemoteCollection},
    enums::{
        FEET_FRAMES_FILM_TYPE, FOOTAGE_TIMECODE_DISPLAY_START_TYPE, FRAMES_COUNT_TYPE,
        GPU_ACCEL_TYPE, TIME_DISPLAY_TYPE, TOOL_TYPE,
    },
    error::{BridgeError, Result},
    proxy::{remote_object, Remote},
};

/// What to do with unsaved changes when closing a project
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseOptions {
    PromptToSaveChanges,
    SaveChanges,
    DoNotSaveChanges,
}

impl CloseOptions {
    /// `None` prompts, `Some(true)` saves, `Some(false)` discards
    pub fn from_save(save: Option<bool>) -> Self {
        match save {
            None => CloseOptions::PromptToSaveChanges,
            Some(true) => CloseOptions::SaveChanges,
            Some(false) => CloseOptions::DoNotSaveChanges,
        }
    }

    fn constant(self) -> &'static str {
        match self {
            CloseOptions::PromptToSaveChanges => "CloseOptions.PROMPT_TO_SAVE_CHANGES",
            CloseOptions::SaveChanges => "CloseOptions.SAVE_CHANGES",
            CloseOptions::DoNotSaveChanges => "CloseOptions.DO_NOT_SAVE_CHANGES",
        }
    }
}

impl ToExtend for CloseOptions {
    fn to_extend(&self) -> String {
        Raw(self.constant()).to_extend()
    }
}

const EXPRESSION_ENGINES: &[&str] = &["javascript-1.0", "extendscript"];

remote_object! {
    /// An After Effects project
    Project => "Project"
}

impl Project {
    /// The single selected item, or `None` when zero or several are selected
    pub fn active_item(&self) -> Result<Option<Item>> {
        self.get_dyn("activeItem")
    }

    pub fn bits_per_channel(&self) -> Result<u8> {
        self.get("bitsPerChannel")
    }

    pub fn set_bits_per_channel(&self, bits: u8) -> Result<()> {
        if ![8, 16, 32].contains(&bits) {
            return Err(BridgeError::validation(format!(
                "'bitsPerChannel' must be 8, 16 or 32, got {bits}"
            )));
        }
        self.set("bitsPerChannel", &bits)
    }

    pub fn compensate_for_scene_referred_profiles(&self) -> Result<bool> {
        self.get("compensateForSceneReferredProfiles")
    }

    pub fn set_compensate_for_scene_referred_profiles(&self, value: bool) -> Result<()> {
        self.set("compensateForSceneReferredProfiles", &value)
    }

    /// True if the project changed since it was last saved
    pub fn dirty(&self) -> Result<bool> {
        self.get("dirty")
    }

    pub fn display_start_frame(&self) -> Result<i64> {
        self.get("displayStartFrame")
    }

    pub fn set_display_start_frame(&self, frame: i64) -> Result<()> {
        super::check_range("displayStartFrame", frame, 0..=1)?;
        self.set("displayStartFrame", &frame)
    }

    pub fn expression_engine(&self) -> Result<String> {
        self.get("expressionEngine")
    }

    pub fn set_expression_engine(&self, engine: &str) -> Result<()> {
        if !EXPRESSION_ENGINES.contains(&engine) {
            return Err(BridgeError::validation(format!(
                "no expression engine named '{engine}', expected one of: {}",
                EXPRESSION_ENGINES.join(", ")
            )));
        }
        self.set("expressionEngine", &engine)
    }

    pub fn feet_frames_film_type(&self) -> Result<&'static str> {
        self.get_enum("feetFramesFilmType", &FEET_FRAMES_FILM_TYPE)
    }

    pub fn set_feet_frames_film_type(&self, label: &str) -> Result<()> {
        self.set_enum("feetFramesFilmType", &FEET_FRAMES_FILM_TYPE, label)
    }

    pub fn footage_timecode_display_start_type(&self) -> Result<&'static str> {
        self.get_enum(
            "footageTimecodeDisplayStartType",
            &FOOTAGE_TIMECODE_DISPLAY_START_TYPE,
        )
    }

    pub fn set_footage_timecode_display_start_type(&self, label: &str) -> Result<()> {
        self.set_enum(
            "footageTimecodeDisplayStartType",
            &FOOTAGE_TIMECODE_DISPLAY_START_TYPE,
            label,
        )
    }

    pub fn frames_count_type(&self) -> Result<&'static str> {
        self.get_enum("framesCountType", &FRAMES_COUNT_TYPE)
    }

    pub fn set_frames_count_type(&self, label: &str) -> Result<()> {
        self.set_enum("framesCountType", &FRAMES_COUNT_TYPE, label)
    }

    pub fn frames_use_feet_frames(&self) -> Result<bool> {
        self.get("framesUseFeetFrames")
    }

    pub fn set_frames_use_feet_frames(&self, value: bool) -> Result<()> {
        self.set("framesUseFeetFrames", &value)
    }

    pub fn gpu_accel_type(&self) -> Result<&'static str> {
        self.get_enum("gpuAccelType", &GPU_ACCEL_TYPE)
    }

    /// Switch GPU acceleration. The type must be one the application reports
    /// as available.
    pub fn set_gpu_accel_type(&self, label: &str) -> Result<()> {
        let code = GPU_ACCEL_TYPE.code(label)?;
        let available = Vec::<i64>::from_value(
            self.handle()
                .session()
                .evaluate("app.availableGPUAccelTypes;")?,
        )?;
        if !available.contains(&code) {
            return Err(BridgeError::validation(format!(
                "GPU acceleration '{label}' is not available on this machine"
            )));
        }
        self.set("gpuAccelType", &code)
    }

    pub fn linear_blending(&self) -> Result<bool> {
        self.get("linearBlending")
    }

    pub fn set_linear_blending(&self, value: bool) -> Result<()> {
        self.set("linearBlending", &value)
    }

    pub fn linearize_working_space(&self) -> Result<bool> {
        self.get("linearizeWorkingSpace")
    }

    pub fn set_linearize_working_space(&self, value: bool) -> Result<()> {
        self.set("linearizeWorkingSpace", &value)
    }

    pub fn num_items(&self) -> Result<usize> {
        self.get("numItems")
    }

    pub fn items(&self) -> Result<ItemCollection> {
        require(self.get_object("items")?, "the project item collection")
    }

    pub fn render_queue(&self) -> Result<RenderQueue> {
        require(self.get_object("renderQueue")?, "the render queue")
    }

    pub fn revision(&self) -> Result<i64> {
        self.get("revision")
    }

    pub fn root_folder(&self) -> Result<FolderItem> {
        require(self.get_object("rootFolder")?, "the root folder")
    }

    /// Items selected in the Project panel
    pub fn selection(&self) -> Result<Vec<Item>> {
        self.get_dyn_list("selection")
    }

    pub fn time_display_type(&self) -> Result<&'static str> {
        self.get_enum("timeDisplayType", &TIME_DISPLAY_TYPE)
    }

    pub fn set_time_display_type(&self, label: &str) -> Result<()> {
        self.set_enum("timeDisplayType", &TIME_DISPLAY_TYPE, label)
    }

    /// The active tool of the Tools panel
    pub fn tool_type(&self) -> Result<&'static str> {
        self.get_enum("toolType", &TOOL_TYPE)
    }

    pub fn set_tool_type(&self, label: &str) -> Result<()> {
        self.set_enum("toolType", &TOOL_TYPE, label)
    }

    pub fn transparency_grid_thumbnails(&self) -> Result<bool> {
        self.get("transparencyGridThumbnails")
    }

    pub fn set_transparency_grid_thumbnails(&self, value: bool) -> Result<()> {
        self.set("transparencyGridThumbnails", &value)
    }

    pub fn working_gamma(&self) -> Result<f64> {
        self.get("workingGamma")
    }

    /// Only 2.2 and 2.4 are accepted
    pub fn set_working_gamma(&self, gamma: f64) -> Result<()> {
        if gamma != 2.2 && gamma != 2.4 {
            return Err(BridgeError::validation(format!(
                "'workingGamma' must be 2.2 or 2.4, got {gamma}"
            )));
        }
        self.set("workingGamma", &gamma)
    }

    pub fn working_space(&self) -> Result<String> {
        self.get("workingSpace")
    }

    /// Set the working colour profile; it must be one the host lists
    pub fn set_working_space(&self, profile: &str) -> Result<()> {
        if !self.list_color_profiles()?.iter().any(|p| p == profile) {
            return Err(BridgeError::validation(format!(
                "'{profile}' is not an available colour profile"
            )));
        }
        self.set("workingSpace", &profile)
    }

    pub fn list_color_profiles(&self) -> Result<Vec<String>> {
        self.invoke("listColorProfiles", &[])
    }

    pub fn xmp_packet(&self) -> Result<String> {
        self.get("xmpPacket")
    }

    pub fn set_xmp_packet(&self, packet: &str) -> Result<()> {
        self.set("xmpPacket", &packet)
    }

    /// File the project is saved in; `None` for an unsaved project
    pub fn file(&self) -> Result<Option<File>> {
        self.get_object("file")
    }

    pub fn compositions(&self) -> Result<Vec<Item>> {
        items_of_type(&self.items()?, "CompItem")
    }

    pub fn footages(&self) -> Result<Vec<Item>> {
        items_of_type(&self.items()?, "FootageItem")
    }

    pub fn folders(&self) -> Result<Vec<Item>> {
        items_of_type(&self.items()?, "FolderItem")
    }

    /// Item at a 0-based position; negative positions count from the end
    pub fn item(&self, index: isize) -> Result<Item> {
        let host = host_index(index, || self.num_items())?;
        self.invoke_dyn("item", &[&host])?
            .ok_or(BridgeError::IndexOutOfRange {
                index,
                length: None,
            })
    }

    pub fn item_by_id(&self, id: i64) -> Result<Option<Item>> {
        self.invoke_dyn("itemByID", &[&id])
    }

    pub fn layer_by_id(&self, id: i64) -> Result<Option<Layer>> {
        self.invoke_dyn("layerByID", &[&id])
    }

    /// First item whose name matches, scanning the whole project
    pub fn item_by_name(&self, name: &str) -> Result<Option<Item>> {
        for item in self.items()?.iter() {
            let item = item?;
            if item.name()? == name {
                return Ok(Some(item));
            }
        }
        Ok(None)
    }

    pub fn auto_fix_expressions(&self, old_text: &str, new_text: &str) -> Result<()> {
        self.invoke::<Option<bool>>("autoFixExpressions", &[&old_text, &new_text])?;
        Ok(())
    }

    /// Close the project. Returns false if the user cancelled a save prompt.
    pub fn close(&self, options: CloseOptions) -> Result<bool> {
        self.invoke("close", &[&options])
    }

    /// Remove duplicate footage; returns how many items were removed
    pub fn consolidate_footage(&self) -> Result<i64> {
        self.invoke("consolidateFootage", &[])
    }

    /// Import a file as footage
    pub fn import_file(
        &self,
        path: &str,
        sequence: bool,
        force_alphabetical: bool,
    ) -> Result<Option<FootageItem>> {
        let session = self.handle().session();
        let options = ImportOptions::create(session)?;
        options.set_file(&File::from_path(session, path)?)?;
        options.set_sequence(sequence)?;
        options.set_force_alphabetical(force_alphabetical)?;
        debug!(path, sequence, "importing file");
        self.invoke_object("importFile", &[&options])
    }

    /// Show the import dialog; a cancelled dialog imports nothing
    pub fn import_file_with_dialog(&self) -> Result<Vec<Item>> {
        self.get_dyn_list("importFileWithDialog()")
    }

    /// Import a placeholder. A text duration is read in the project's time
    /// display format at `frame_rate`.
    pub fn import_placeholder<'a>(
        &self,
        name: &str,
        width: u32,
        height: u32,
        frame_rate: f64,
        duration: impl Into<TimeSpan<'a>>,
    ) -> Result<Option<FootageItem>> {
        let duration = duration.into().seconds_at(frame_rate);
        self.invoke_object(
            "importPlaceholder",
            &[&name, &width, &height, &frame_rate, &Raw(&duration)],
        )
    }

    /// Remove every item except the given ones; returns how many were removed
    pub fn reduce_project(&self, keep: &[Item]) -> Result<i64> {
        self.invoke("reduceProject", &[&keep])
    }

    pub fn remove_unused_footage(&self) -> Result<i64> {
        self.invoke("removeUnusedFootage", &[])
    }

    /// Save in place, or to `path` when given
    pub fn save(&self, path: Option<&str>) -> Result<bool> {
        match path {
            Some(path) => {
                let file = File::from_path(self.handle().session(), path)?;
                self.invoke("save", &[&file])
            }
            None => self.invoke("save", &[]),
        }
    }

    /// Prompt for a file name and save; false if the dialog was cancelled
    pub fn save_with_dialog(&self) -> Result<bool> {
        Ok(self.invoke::<Option<bool>>("saveWithDialog", &[])?.unwrap_or(false))
    }

    /// Save under the next incremented file name
    pub fn save_incremental(&self) -> Result<()> {
        self.handle()
            .session()
            .application()?
            .execute_command(COMMAND_SAVE_INCREMENTAL)
    }

    pub fn set_default_import_folder(&self, path: &str) -> Result<bool> {
        let folder = Folder::from_path(self.handle().session(), path)?;
        self.invoke("setDefaultImportFolder", &[&folder])
    }

    pub fn show_window(&self, show: bool) -> Result<()> {
        self.invoke::<Option<bool>>("showWindow", &[&show])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{
        codec::ObjectDescriptor,
        proxy::{Handle, RemoteObject},
        session::testing::MockTransport,
    };

    fn project() -> (Project, MockTransport) {
        let (session, mock) = MockTransport::session();
        let project =
            Project::from_handle(Handle::new(session, ObjectDescriptor::new("Project", "p1")));
        (project, mock)
    }

    #[test]
    fn test_validation_happens_before_sending() {
        let (project, mock) = project();
        assert!(matches!(
            project.set_bits_per_channel(12),
            Err(BridgeError::DomainValidation(_))
        ));
        assert!(project.set_working_gamma(1.8).is_err());
        assert!(project.set_expression_engine("lua").is_err());
        assert!(project.set_time_display_type("Seconds").is_err());
        assert!(project.set_display_start_frame(2).is_err());
        assert!(mock.sent().is_empty());
    }

    #[test]
    fn test_enum_properties_send_codes() {
        let (project, mock) = project();
        project.set_time_display_type("frames").unwrap();
        mock.respond("2600");
        assert_eq!(project.frames_count_type().unwrap(), "Start at 0");
        assert_eq!(
            mock.sent_lines(),
            vec![
                r#"$._pydobe["p1"].timeDisplayType = 2013;"#,
                r#"$._pydobe["p1"].framesCountType;"#,
            ]
        );
    }

    #[test]
    fn test_tool_type() {
        let (project, mock) = project();
        mock.respond("9010");
        assert_eq!(project.tool_type().unwrap(), "Zoom");
        assert!(project.set_tool_type("Laser").is_err());
        project.set_tool_type("pen").unwrap();
        assert_eq!(
            mock.sent_lines(),
            vec![
                r#"$._pydobe["p1"].toolType;"#,
                r#"$._pydobe["p1"].toolType = 9019;"#,
            ]
        );
    }

    #[test]
    fn test_dialogs_report_cancellation() {
        let (project, mock) = project();
        mock.respond("null");
        assert!(project.import_file_with_dialog().unwrap().is_empty());
        mock.respond("undefined");
        assert!(!project.save_with_dialog().unwrap());
        assert_eq!(
            mock.sent_lines(),
            vec![
                r#"$._pydobe["p1"].importFileWithDialog();"#,
                r#"$._pydobe["p1"].saveWithDialog();"#,
            ]
        );
    }

    #[test]
    fn test_import_placeholder_reads_text_duration_on_host() {
        let (project, mock) = project();
        mock.respond_object("FootageItem", "p2");
        let footage = project
            .import_placeholder("Missing", 1920, 1080, 24.0, "0:00:02:12")
            .unwrap();
        assert!(footage.is_some());
        assert_eq!(
            mock.sent_lines(),
            vec![
                r#"$._pydobe["p1"].importPlaceholder("Missing", 1920, 1080, 24, currentFormatToTime("0:00:02:12", 24));"#,
            ]
        );
    }

    #[test]
    fn test_gpu_accel_type_checks_availability() {
        let (project, mock) = project();
        mock.respond("[1813, 1816]");
        assert!(matches!(
            project.set_gpu_accel_type("CUDA"),
            Err(BridgeError::DomainValidation(_))
        ));
        mock.respond("[1813, 1816]");
        project.set_gpu_accel_type("metal").unwrap();
        assert_eq!(
            mock.sent_lines().last().unwrap(),
            r#"$._pydobe["p1"].gpuAccelType = 1813;"#
        );
    }

    #[test]
    fn test_item_translates_index() {
        let (project, mock) = project();
        mock.respond_object("FootageItem", "p2");
        let item = project.item(0).unwrap();
        assert!(matches!(item, Item::Footage(_)));

        mock.respond("4");
        mock.respond_object("CompItem", "p3");
        project.item(-2).unwrap();

        assert_eq!(
            mock.sent_lines(),
            vec![
                r#"$._pydobe["p1"].item(1);"#,
                r#"$._pydobe["p1"].numItems;"#,
                r#"$._pydobe["p1"].item(3);"#,
            ]
        );
    }

    #[test]
    fn test_selection_binds_each_element() {
        let (project, mock) = project();
        mock.respond(
            r#"[{"isObject": true, "objectType": "CompItem", "pydobeId": "p2"},
                {"isObject": true, "objectType": "FolderItem", "pydobeId": "p3"}]"#,
        );
        let selection = project.selection().unwrap();
        assert_eq!(selection.len(), 2);
        assert!(matches!(selection[0], Item::Comp(_)));
        assert!(matches!(selection[1], Item::Folder(_)));
    }

    #[test]
    fn test_close_options() {
        let (project, mock) = project();
        mock.respond("true");
        assert!(project.close(CloseOptions::from_save(Some(true))).unwrap());
        assert_eq!(
            mock.sent_lines(),
            vec![r#"$._pydobe["p1"].close(CloseOptions.SAVE_CHANGES);"#]
        );
    }

    #[test]
    fn test_import_file_builds_options() {
        let (project, mock) = project();
        mock.respond_object("ImportOptions", "p2");
        mock.respond_object("File", "p3");
        mock.respond("undefined");
        mock.respond("undefined");
        mock.respond("undefined");
        mock.respond_object("FootageItem", "p4");
        let footage = project.import_file("/media/plate.exr", true, false).unwrap();
        assert!(footage.is_some());
        assert_eq!(
            mock.sent_lines(),
            vec![
                "new ImportOptions();",
                r#"File("/media/plate.exr");"#,
                r#"$._pydobe["p2"].file = $._pydobe["p3"];"#,
                r#"$._pydobe["p2"].sequence = true;"#,
                r#"$._pydobe["p2"].forceAlphabetical = false;"#,
                r#"$._pydobe["p1"].importFile($._pydobe["p2"]);"#,
            ]
        );
    }
}
