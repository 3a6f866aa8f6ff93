use super::{check_range, misc::File, rgb};
use crate::{
    codec::{hex_to_rgb, Raw},
    enums::{ALPHA_MODE, FIELD_SEPARATION_TYPE, PULLDOWN_PHASE},
    error::Result,
    proxy::{remote_object, Remote},
};

remote_object! {
    /// Footage backed by a file or an image sequence
    FileSource => "FileSource"
}

remote_object! {
    /// Footage generated as a solid colour
    SolidSource => "SolidSource"
}

remote_object! {
    /// Stand-in for footage that is not available
    PlaceholderSource => "PlaceholderSource"
}

family! {
    /// The source behind a footage item
    FootageSource, "footage source" {
        File(FileSource) <= FileSource,
        Solid(SolidSource) <= SolidSource,
        Placeholder(PlaceholderSource) <= PlaceholderSource,
    }
}

/// Interpretation settings common to every footage source
pub trait FootageSourceLike: Remote {
    fn alpha_mode(&self) -> Result<&'static str> {
        self.get_enum("alphaMode", &ALPHA_MODE)
    }

    fn set_alpha_mode(&self, label: &str) -> Result<()> {
        self.set_enum("alphaMode", &ALPHA_MODE, label)
    }

    /// Frame rate the footage is interpreted at; 0 means native
    fn conform_frame_rate(&self) -> Result<f64> {
        self.get("conformFrameRate")
    }

    fn set_conform_frame_rate(&self, value: f64) -> Result<()> {
        check_range("conformFrameRate", value, 0.0..=99.0)?;
        self.set("conformFrameRate", &value)
    }

    fn display_frame_rate(&self) -> Result<f64> {
        self.get("displayFrameRate")
    }

    fn field_separation_type(&self) -> Result<&'static str> {
        self.get_enum("fieldSeparationType", &FIELD_SEPARATION_TYPE)
    }

    fn set_field_separation_type(&self, label: &str) -> Result<()> {
        self.set_enum("fieldSeparationType", &FIELD_SEPARATION_TYPE, label)
    }

    fn has_alpha(&self) -> Result<bool> {
        self.get("hasAlpha")
    }

    fn high_quality_field_separation(&self) -> Result<bool> {
        self.get("highQualityFieldSeparation")
    }

    fn set_high_quality_field_separation(&self, value: bool) -> Result<()> {
        self.set("highQualityFieldSeparation", &value)
    }

    fn invert_alpha(&self) -> Result<bool> {
        self.get("invertAlpha")
    }

    fn set_invert_alpha(&self, value: bool) -> Result<()> {
        self.set("invertAlpha", &value)
    }

    fn is_still(&self) -> Result<bool> {
        self.get("isStill")
    }

    /// How many times the footage plays in a row
    fn loop_count(&self) -> Result<u32> {
        self.get("loop")
    }

    fn set_loop_count(&self, value: u32) -> Result<()> {
        check_range("loop", value, 1..=9999)?;
        self.set("loop", &value)
    }

    fn native_frame_rate(&self) -> Result<f64> {
        self.get("nativeFrameRate")
    }

    fn premul_color(&self) -> Result<[f64; 3]> {
        rgb(self.get("premulColor")?)
    }

    fn set_premul_color(&self, color: [f64; 3]) -> Result<()> {
        self.set("premulColor", &color)
    }

    fn remove_pulldown(&self) -> Result<&'static str> {
        self.get_enum("removePulldown", &PULLDOWN_PHASE)
    }

    fn set_remove_pulldown(&self, label: &str) -> Result<()> {
        self.set_enum("removePulldown", &PULLDOWN_PHASE, label)
    }

    fn guess_alpha_mode(&self) -> Result<()> {
        self.invoke::<Option<bool>>("guessAlphaMode", &[])?;
        Ok(())
    }

    /// Let the host detect the pulldown phase, for 24P advance or 3:2 pulldown
    fn guess_pulldown(&self, advance_24p: bool) -> Result<()> {
        let method = if advance_24p {
            Raw("PulldownMethod.ADVANCE_24P")
        } else {
            Raw("PulldownMethod.PULLDOWN_3_2")
        };
        self.invoke::<Option<bool>>("guessPulldown", &[&method])?;
        Ok(())
    }
}

impl FootageSourceLike for FileSource {}
impl FootageSourceLike for SolidSource {}
impl FootageSourceLike for PlaceholderSource {}
impl FootageSourceLike for FootageSource {}

impl FileSource {
    pub fn file(&self) -> Result<Option<File>> {
        self.get_object("file")
    }

    /// Path the project remembers for footage that went missing
    pub fn missing_footage_path(&self) -> Result<String> {
        self.get("missingFootagePath")
    }

    pub fn reload(&self) -> Result<()> {
        self.invoke::<Option<bool>>("reload", &[])?;
        Ok(())
    }
}

impl SolidSource {
    pub fn color(&self) -> Result<[f64; 3]> {
        rgb(self.get("color")?)
    }

    pub fn set_color(&self, color: [f64; 3]) -> Result<()> {
        for channel in color {
            check_range("color", channel, 0.0..=1.0)?;
        }
        self.set("color", &color)
    }

    /// Set the colour from `#rrggbb`
    pub fn set_color_hex(&self, hex: &str) -> Result<()> {
        self.set_color(hex_to_rgb(hex)?)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{
        codec::ObjectDescriptor,
        error::BridgeError,
        proxy::{Handle, RemoteObject},
        session::testing::MockTransport,
    };

    #[test]
    fn test_solid_color_from_hex() {
        let (session, mock) = MockTransport::session();
        let solid = SolidSource::from_handle(Handle::new(
            session,
            ObjectDescriptor::new("SolidSource", "p1"),
        ));
        solid.set_color_hex("#ff0000").unwrap();
        assert_eq!(
            mock.sent_lines(),
            vec![r#"$._pydobe["p1"].color = [1, 0, 0];"#]
        );

        assert!(matches!(
            solid.set_color([1.5, 0.0, 0.0]),
            Err(BridgeError::DomainValidation(_))
        ));
        assert_eq!(mock.sent_lines().len(), 1);
    }

    #[test]
    fn test_interpretation_settings() {
        let (session, mock) = MockTransport::session();
        let source = FileSource::from_handle(Handle::new(
            session,
            ObjectDescriptor::new("FileSource", "p1"),
        ));
        source.guess_pulldown(true).unwrap();
        assert!(source.set_loop_count(0).is_err());
        source.set_loop_count(3).unwrap();

        assert_eq!(
            mock.sent_lines(),
            vec![
                r#"$._pydobe["p1"].guessPulldown(PulldownMethod.ADVANCE_24P);"#,
                r#"$._pydobe["p1"].loop = 3;"#,
            ]
        );
    }

    #[test]
    fn test_footage_source_family() {
        let (session, mock) = MockTransport::session();
        let footage = crate::objects::FootageItem::from_handle(Handle::new(
            session,
            ObjectDescriptor::new("FootageItem", "p1"),
        ));
        mock.respond_object("PlaceholderSource", "p2");
        let source = footage.main_source().unwrap();
        assert!(matches!(source, FootageSource::Placeholder(_)));
        assert_eq!(source.object_type(), "PlaceholderSource");
    }
}
