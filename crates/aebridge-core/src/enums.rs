//! Enumerated host constants
//!
//! The host stores enumerations as integer codes. Each [`EnumTable`] maps codes
//! to the labels shown in the application's UI. Label lookup ignores case.

use crate::error::{BridgeError, Result};

/// A bidirectional mapping between host integer codes and labels
#[derive(Debug)]
pub struct EnumTable {
    name: &'static str,
    entries: &'static [(i64, &'static str)],
}

impl EnumTable {
    pub const fn new(name: &'static str, entries: &'static [(i64, &'static str)]) -> Self {
        Self { name, entries }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn entries(&self) -> &'static [(i64, &'static str)] {
        self.entries
    }

    pub fn labels(&self) -> impl Iterator<Item = &'static str> {
        self.entries.iter().map(|(_, label)| *label)
    }

    /// Label for a code the host reported
    pub fn label(&self, code: i64) -> Result<&'static str> {
        self.entries
            .iter()
            .find(|(c, _)| *c == code)
            .map(|(_, label)| *label)
            .ok_or_else(|| BridgeError::unexpected_value(&format!("a {} code", self.name), code))
    }

    /// Code for a label, matched case-insensitively
    pub fn code(&self, label: &str) -> Result<i64> {
        let wanted = label.trim();
        self.entries
            .iter()
            .find(|(_, l)| l.eq_ignore_ascii_case(wanted))
            .map(|(code, _)| *code)
            .ok_or_else(|| {
                BridgeError::validation(format!(
                    "'{label}' is not a {}; expected one of: {}",
                    self.name,
                    self.labels().collect::<Vec<_>>().join(", ")
                ))
            })
    }

    /// Reject duplicate codes and labels that differ only by case
    pub fn validate(&self) -> Result<()> {
        for (i, (code, label)) in self.entries.iter().enumerate() {
            for (other_code, other_label) in &self.entries[i + 1..] {
                if code == other_code {
                    return Err(BridgeError::validation(format!(
                        "{} maps code {code} twice",
                        self.name
                    )));
                }
                if label.eq_ignore_ascii_case(other_label) {
                    return Err(BridgeError::validation(format!(
                        "{} has ambiguous labels '{label}' and '{other_label}'",
                        self.name
                    )));
                }
            }
        }
        Ok(())
    }
}

pub static LABEL_COLOR: EnumTable = EnumTable::new(
    "label colour",
    &[
        (0, "None"),
        (1, "Red"),
        (2, "Yellow"),
        (3, "Aqua"),
        (4, "Pink"),
        (5, "Lavender"),
        (6, "Peach"),
        (7, "Sea Foam"),
        (8, "Blue"),
        (9, "Green"),
        (10, "Purple"),
        (11, "Orange"),
        (12, "Brown"),
        (13, "Fuchsia"),
        (14, "Cyan"),
        (15, "Sandstone"),
        (16, "Dark Green"),
    ],
);

pub static BLENDING_MODE: EnumTable = EnumTable::new(
    "blending mode",
    &[
        (5212, "Normal"),
        (5213, "Dissolve"),
        (5214, "Dancing Dissolve"),
        (5215, "Darken"),
        (5216, "Multiply"),
        (5217, "Color Burn"),
        (5218, "Classic Color Burn"),
        (5219, "Linear Burn"),
        (5220, "Add"),
        (5221, "Lighten"),
        (5222, "Screen"),
        (5223, "Color Dodge"),
        (5224, "Classic Color Dodge"),
        (5225, "Linear Dodge"),
        (5226, "Overlay"),
        (5227, "Soft Light"),
        (5228, "Hard Light"),
        (5229, "Linear Light"),
        (5230, "Vivid Light"),
        (5231, "Pin Light"),
        (5232, "Hard Mix"),
        (5233, "Difference"),
        (5234, "Classic Difference"),
        (5235, "Exclusion"),
        (5236, "Hue"),
        (5237, "Saturation"),
        (5238, "Color"),
        (5239, "Luminosity"),
        (5240, "Stencil Alpha"),
        (5241, "Stencil Luma"),
        (5242, "Silhouette Alpha"),
        (5243, "Silhouette Luma"),
        (5244, "Alpha Add"),
        (5245, "Luminescent Premul"),
        (5246, "Lighter Color"),
        (5247, "Darker Color"),
        (5248, "Subtract"),
        (5249, "Divide"),
    ],
);

pub static TIME_DISPLAY_TYPE: EnumTable =
    EnumTable::new("time display type", &[(2012, "Timecode"), (2013, "Frames")]);

pub static FRAMES_COUNT_TYPE: EnumTable = EnumTable::new(
    "frames count type",
    &[
        (2600, "Start at 0"),
        (2601, "Start at 1"),
        (2602, "Timecode conversion"),
    ],
);

pub static FEET_FRAMES_FILM_TYPE: EnumTable =
    EnumTable::new("feet+frames film type", &[(2412, "16mm"), (2413, "35mm")]);

pub static FOOTAGE_TIMECODE_DISPLAY_START_TYPE: EnumTable = EnumTable::new(
    "footage timecode display start type",
    &[(2212, "Start at 0"), (2213, "Use source media")],
);

pub static GPU_ACCEL_TYPE: EnumTable = EnumTable::new(
    "GPU acceleration type",
    &[
        (1812, "CUDA"),
        (1813, "Metal"),
        (1814, "OpenCL"),
        (1816, "Software"),
        (1817, "Vulkan"),
    ],
);

pub static FRAME_BLENDING_TYPE: EnumTable = EnumTable::new(
    "frame blending type",
    &[(4012, "None"), (4013, "Frame mix"), (4014, "Pixel motion")],
);

pub static ALPHA_MODE: EnumTable = EnumTable::new(
    "alpha mode",
    &[(5412, "Ignore"), (5413, "Straight"), (5414, "Premultiplied")],
);

pub static FIELD_SEPARATION_TYPE: EnumTable = EnumTable::new(
    "field separation type",
    &[
        (5612, "Off"),
        (5613, "Upper field first"),
        (5614, "Lower field first"),
    ],
);

pub static PULLDOWN_PHASE: EnumTable = EnumTable::new(
    "pulldown phase",
    &[
        (5812, "Off"),
        (5813, "WSSWW"),
        (5814, "SSWWW"),
        (5815, "SWWWS"),
        (5816, "WWWSS"),
        (5817, "WWSSW"),
        (5818, "WWWSW_24P_ADVANCE"),
        (5819, "WWSWW_24P_ADVANCE"),
        (5820, "WSWWW_24P_ADVANCE"),
        (5821, "SWWWW_24P_ADVANCE"),
        (5822, "WWWWS_24P_ADVANCE"),
    ],
);

/// Tools of the Tools panel
pub static TOOL_TYPE: EnumTable = EnumTable::new(
    "tool",
    &[
        (9000, "Selection"),
        (9001, "Rotation"),
        (9002, "Unified Camera"),
        (9003, "Orbit Camera"),
        (9004, "Track XY Camera"),
        (9005, "Track Z Camera"),
        (9006, "Brush"),
        (9007, "Clone Stamp"),
        (9008, "Eraser"),
        (9009, "Hand"),
        (9010, "Zoom"),
        (9011, "Pan Behind"),
        (9012, "Rectangle"),
        (9013, "Rounded Rectangle"),
        (9014, "Ellipse"),
        (9015, "Polygon"),
        (9016, "Star"),
        (9017, "Horizontal Type"),
        (9018, "Vertical Type"),
        (9019, "Pen"),
        (9020, "Mask Feather"),
        (9021, "Add Vertex"),
        (9022, "Delete Vertex"),
        (9023, "Convert Vertex"),
        (9024, "Puppet Pin"),
        (9025, "Puppet Starch"),
        (9026, "Puppet Overlap"),
        (9027, "Roto Brush"),
        (9028, "Refine Edge"),
    ],
);

pub static ALL_TABLES: &[&EnumTable] = &[
    &LABEL_COLOR,
    &BLENDING_MODE,
    &TIME_DISPLAY_TYPE,
    &FRAMES_COUNT_TYPE,
    &FEET_FRAMES_FILM_TYPE,
    &FOOTAGE_TIMECODE_DISPLAY_START_TYPE,
    &GPU_ACCEL_TYPE,
    &FRAME_BLENDING_TYPE,
    &ALPHA_MODE,
    &FIELD_SEPARATION_TYPE,
    &PULLDOWN_PHASE,
    &TOOL_TYPE,
];

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_tables_are_valid() {
        for table in ALL_TABLES {
            table.validate().unwrap();
        }
    }

    #[test]
    fn test_every_entry_round_trips() {
        for table in ALL_TABLES {
            for &(code, label) in table.entries() {
                assert_eq!(table.label(code).unwrap(), label);
                assert_eq!(table.code(label).unwrap(), code);
            }
        }
    }

    #[test]
    fn test_label_lookup_ignores_case() {
        assert_eq!(BLENDING_MODE.code("soft light").unwrap(), 5227);
        assert_eq!(LABEL_COLOR.code("SEA FOAM").unwrap(), 7);
        assert_eq!(TOOL_TYPE.code("puppet pin").unwrap(), 9024);
    }

    #[test]
    fn test_unknown_entries() {
        assert!(matches!(
            BLENDING_MODE.label(1),
            Err(BridgeError::UnexpectedValue { .. })
        ));
        assert!(matches!(
            ALPHA_MODE.code("Opaque"),
            Err(BridgeError::DomainValidation(_))
        ));
    }

    #[test]
    fn test_validate_rejects_case_collisions() {
        static BAD: EnumTable = EnumTable::new("bad", &[(1, "Red"), (2, "RED")]);
        assert!(BAD.validate().is_err());
        static DUP: EnumTable = EnumTable::new("dup", &[(1, "Red"), (1, "Blue")]);
        assert!(DUP.validate().is_err());
    }
}
