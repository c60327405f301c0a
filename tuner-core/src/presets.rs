//! # Tuning Presets
//!
//! Named reference sets for common plucked-string instruments. The tables
//! are built once on first access.

use crate::reference::ReferenceSpec;
use once_cell::sync::Lazy;

/// A named set of reference tunings.
#[derive(Debug, Clone)]
pub struct Preset {
    /// Preset identifier, e.g. "standard"
    pub name: &'static str,
    pub description: &'static str,
    pub references: Vec<ReferenceSpec>,
    /// Frame length that fits the lowest reference plus a full search window
    pub buffer_length: usize,
}

/// Identifier of the preset used when nothing else is configured.
pub const DEFAULT_PRESET: &str = "standard";

static PRESETS: Lazy<Vec<Preset>> = Lazy::new(|| {
    let build = |pairs: &[(&str, f32)]| -> Vec<ReferenceSpec> {
        pairs
            .iter()
            .map(|&(name, frequency)| ReferenceSpec::new(name, frequency))
            .collect()
    };

    vec![
        Preset {
            name: "standard",
            description: "Six-string guitar, E A D G B E",
            references: build(&[
                ("e2", 82.4069),
                ("a2", 110.0),
                ("d3", 146.832),
                ("g3", 195.998),
                ("b3", 246.932),
                ("e4", 329.628),
            ]),
            buffer_length: 2048,
        },
        Preset {
            name: "drop-d",
            description: "Six-string guitar, D A D G B E",
            references: build(&[
                ("d2", 73.4162),
                ("a2", 110.0),
                ("d3", 146.832),
                ("g3", 195.998),
                ("b3", 246.932),
                ("e4", 329.628),
            ]),
            buffer_length: 2048,
        },
        Preset {
            name: "bass",
            description: "Four-string bass, E A D G",
            references: build(&[
                ("e1", 41.2034),
                ("a1", 55.0),
                ("d2", 73.4162),
                ("g2", 97.9989),
            ]),
            buffer_length: 4096,
        },
        Preset {
            name: "ukulele",
            description: "Soprano ukulele, re-entrant G C E A",
            references: build(&[
                ("g4", 391.995),
                ("c4", 261.626),
                ("e4", 329.628),
                ("a4", 440.0),
            ]),
            buffer_length: 2048,
        },
    ]
});

/// Looks up a preset by name.
pub fn preset(name: &str) -> Option<&'static Preset> {
    PRESETS.iter().find(|p| p.name == name)
}

/// All known presets in display order.
pub fn presets() -> impl Iterator<Item = &'static Preset> {
    PRESETS.iter()
}

/// The six-string standard guitar references.
pub fn standard_guitar() -> Vec<ReferenceSpec> {
    preset(DEFAULT_PRESET)
        .map(|p| p.references.clone())
        .unwrap_or_default()
}
