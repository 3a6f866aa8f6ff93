use std::sync::Arc;

use super::require;
use crate::{
    codec::quote,
    error::Result,
    proxy::{remote_object, Remote, RemoteObject},
    session::Session,
};

remote_object! {
    /// A host-side file reference. The file need not exist.
    File => "File"
}

remote_object! {
    /// A host-side directory reference
    Folder => "Folder"
}

remote_object! {
    ImportOptions => "ImportOptions"
}

remote_object! {
    /// A composition, layer or footage viewer panel
    Viewer => "Viewer"
}

remote_object! {
    RenderQueue => "RenderQueue"
}

/// Evaluate a constructor expression that must yield an object of type `T`
fn construct<T: RemoteObject>(session: &Arc<Session>, line: &str) -> Result<T> {
    let handle = require(session.evaluate_handle(line)?, T::TYPE_NAME)?;
    T::from_handle_checked(handle)
}

impl File {
    /// Create a file reference in the host for `path`
    pub fn from_path(session: &Arc<Session>, path: &str) -> Result<Self> {
        construct(session, &format!("File({});", quote(path)))
    }

    pub fn name(&self) -> Result<String> {
        self.get("name")
    }

    /// Name in the platform's file system encoding
    pub fn fs_name(&self) -> Result<String> {
        self.get("fsName")
    }

    pub fn full_name(&self) -> Result<String> {
        self.get("fullName")
    }

    pub fn path(&self) -> Result<String> {
        self.get("path")
    }

    pub fn exists(&self) -> Result<bool> {
        self.get("exists")
    }
}

impl Folder {
    pub fn from_path(session: &Arc<Session>, path: &str) -> Result<Self> {
        construct(session, &format!("Folder({});", quote(path)))
    }

    pub fn name(&self) -> Result<String> {
        self.get("name")
    }

    pub fn fs_name(&self) -> Result<String> {
        self.get("fsName")
    }

    pub fn path(&self) -> Result<String> {
        self.get("path")
    }

    pub fn exists(&self) -> Result<bool> {
        self.get("exists")
    }
}

impl ImportOptions {
    pub fn create(session: &Arc<Session>) -> Result<Self> {
        construct(session, "new ImportOptions();")
    }

    pub fn file(&self) -> Result<Option<File>> {
        self.get_object("file")
    }

    pub fn set_file(&self, file: &File) -> Result<()> {
        self.set("file", file)
    }

    /// Import the file as the first frame of an image sequence
    pub fn sequence(&self) -> Result<bool> {
        self.get("sequence")
    }

    pub fn set_sequence(&self, value: bool) -> Result<()> {
        self.set("sequence", &value)
    }

    pub fn force_alphabetical(&self) -> Result<bool> {
        self.get("forceAlphabetical")
    }

    pub fn set_force_alphabetical(&self, value: bool) -> Result<()> {
        self.set("forceAlphabetical", &value)
    }
}

impl Viewer {
    pub fn active(&self) -> Result<bool> {
        self.get("active")
    }

    /// Bring the viewer to the front
    pub fn set_active(&self) -> Result<bool> {
        self.invoke("setActive", &[])
    }

    pub fn maximized(&self) -> Result<bool> {
        self.get("maximized")
    }

    pub fn set_maximized(&self, value: bool) -> Result<()> {
        self.set("maximized", &value)
    }
}

impl RenderQueue {
    pub fn num_items(&self) -> Result<usize> {
        self.get("numItems")
    }

    pub fn rendering(&self) -> Result<bool> {
        self.get("rendering")
    }

    /// Render every queued item. Blocks the host until done.
    pub fn render(&self) -> Result<()> {
        self.invoke::<Option<bool>>("render", &[])?;
        Ok(())
    }

    pub fn stop_rendering(&self) -> Result<()> {
        self.invoke::<Option<bool>>("stopRendering", &[])?;
        Ok(())
    }

    pub fn show_window(&self, visible: bool) -> Result<()> {
        self.invoke::<Option<bool>>("showWindow", &[&visible])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{error::BridgeError, session::testing::MockTransport};

    #[test]
    fn test_file_from_path_quotes() {
        let (session, mock) = MockTransport::session();
        mock.respond_object("File", "p1");
        mock.respond(r#""C:\\renders\\out.mov""#);
        let file = File::from_path(&session, r"C:\renders\out.mov").unwrap();
        assert_eq!(file.fs_name().unwrap(), r"C:\renders\out.mov");
        assert_eq!(
            mock.sent_lines(),
            vec![
                r#"File("C:\\renders\\out.mov");"#,
                r#"$._pydobe["p1"].fsName;"#,
            ]
        );
    }

    #[test]
    fn test_constructor_checks_type() {
        let (session, mock) = MockTransport::session();
        mock.respond_object("Folder", "p1");
        assert!(matches!(
            File::from_path(&session, "/tmp"),
            Err(BridgeError::UnexpectedRemoteType { .. })
        ));
        assert!(matches!(
            ImportOptions::create(&session),
            Err(BridgeError::UnexpectedValue { .. })
        ));
    }

    #[test]
    fn test_render_queue_calls() {
        let (session, mock) = MockTransport::session();
        mock.respond_object("RenderQueue", "p1");
        let queue: RenderQueue = construct(&session, "app.project.renderQueue;").unwrap();
        queue.show_window(false).unwrap();
        queue.render().unwrap();
        assert_eq!(
            &mock.sent_lines()[1..],
            &[
                r#"$._pydobe["p1"].showWindow(false);"#.to_string(),
                r#"$._pydobe["p1"].render();"#.to_string(),
            ]
        );
    }
}
