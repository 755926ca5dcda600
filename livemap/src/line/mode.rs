//! Mode groups for rail lines.
//!
//! Groups canonical line codes into named transit modes. The groups mirror
//! the operator's network: metro, commuter rail, and the named light-rail
//! branches. Bus is not a code-mapped mode; bus vehicles carry the bus route
//! type on the vehicle record.

/// A named transit mode grouping one or more lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransitMode {
    Metro,
    Commuter,
    Tram,
    Roslagsbanan,
    Saltsjobanan,
    Lidingobanan,
    Nockebybanan,
    SparvagCity,
}

impl TransitMode {
    /// All modes, in display order.
    pub const ALL: [TransitMode; 8] = [
        TransitMode::Metro,
        TransitMode::Commuter,
        TransitMode::Tram,
        TransitMode::Roslagsbanan,
        TransitMode::Saltsjobanan,
        TransitMode::Lidingobanan,
        TransitMode::Nockebybanan,
        TransitMode::SparvagCity,
    ];

    /// Canonical line codes belonging to this mode.
    pub fn lines(&self) -> &'static [&'static str] {
        match self {
            TransitMode::Metro => &["10", "11", "13", "14", "17", "18", "19"],
            TransitMode::Commuter => &["40", "41", "43", "43X", "48"],
            TransitMode::Tram => &["30", "31"],
            TransitMode::Roslagsbanan => &["27", "27S", "28", "28S", "29"],
            TransitMode::Saltsjobanan => &["25", "26"],
            TransitMode::Lidingobanan => &["21"],
            TransitMode::Nockebybanan => &["12"],
            TransitMode::SparvagCity => &["7"],
        }
    }

    /// Display label.
    pub fn label(&self) -> &'static str {
        match self {
            TransitMode::Metro => "Tunnelbana",
            TransitMode::Commuter => "Pendeltåg",
            TransitMode::Tram => "Tvärbanan",
            TransitMode::Roslagsbanan => "Roslagsbanan",
            TransitMode::Saltsjobanan => "Saltsjöbanan",
            TransitMode::Lidingobanan => "Lidingöbanan",
            TransitMode::Nockebybanan => "Nockebybanan",
            TransitMode::SparvagCity => "Spårväg City",
        }
    }
}

/// Find the mode group containing a canonical line code, if any.
pub fn mode_for_line(code: &str) -> Option<TransitMode> {
    TransitMode::ALL
        .into_iter()
        .find(|mode| mode.lines().contains(&code))
}
