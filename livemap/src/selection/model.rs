//! The selection state machine.

use std::collections::BTreeSet;

use crate::line::normalize;

/// Reserved token meaning "hide everything" in the persisted form.
pub const NONE_TOKEN: &str = "__NONE__";

/// Reserved token meaning "all buses are selected" in the persisted form.
pub const BUS_TOKEN: &str = "__BUS__";

/// Which lines are currently visible.
///
/// `All` is the default (no restriction). `None` is an explicit empty
/// selection, distinct from the default: it means the user cleared
/// everything and nothing is shown. `Subset` restricts to named line codes,
/// optionally extended with "all buses" via the bus flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionState {
    All,
    None,
    Subset {
        codes: BTreeSet<String>,
        bus: bool,
    },
}

impl Default for SelectionState {
    fn default() -> Self {
        SelectionState::All
    }
}

impl SelectionState {
    /// Build a subset containing a single line code.
    fn single(code: String) -> Self {
        let mut codes = BTreeSet::new();
        codes.insert(code);
        SelectionState::Subset { codes, bus: false }
    }

    /// Toggle one line code.
    ///
    /// From `All` or `None` this starts a fresh filter containing only the
    /// given line. Within a subset the code is toggled; if the subset ends
    /// up completely empty the state becomes `None`, not `All`.
    pub fn toggle_line(&mut self, raw: &str) {
        let code = normalize(raw);
        if code.is_empty() {
            return;
        }

        if code == NONE_TOKEN || code == BUS_TOKEN {
            return;
        }

        match self {
            SelectionState::All | SelectionState::None => {
                *self = SelectionState::single(code);
            }
            SelectionState::Subset { codes, bus } => {
                if !codes.remove(&code) {
                    codes.insert(code);
                }
                if codes.is_empty() && !*bus {
                    *self = SelectionState::None;
                }
            }
        }
    }

    /// Toggle the "all buses" flag.
    ///
    /// Symmetric to [`toggle_line`](Self::toggle_line): from `All` or `None`
    /// this starts a bus-only filter; within a subset the flag is toggled
    /// and an emptied subset becomes `None`.
    pub fn toggle_bus(&mut self) {
        match self {
            SelectionState::All | SelectionState::None => {
                *self = SelectionState::Subset {
                    codes: BTreeSet::new(),
                    bus: true,
                };
            }
            SelectionState::Subset { codes, bus } => {
                *bus = !*bus;
                if codes.is_empty() && !*bus {
                    *self = SelectionState::None;
                }
            }
        }
    }

    /// Replace the selection from free-text search input.
    ///
    /// The input is split on commas; `bus`/`buss` (any case) sets the bus
    /// flag and everything else is normalized to a line code. This is an
    /// absolute set operation, not a toggle. Empty or garbage input leaves
    /// the state untouched.
    pub fn set_from_search(&mut self, raw: &str) {
        let mut codes = BTreeSet::new();
        let mut bus = false;

        for part in raw.split(',') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }
            if part.eq_ignore_ascii_case("bus") || part.eq_ignore_ascii_case("buss") || part == BUS_TOKEN
            {
                bus = true;
                continue;
            }
            let code = normalize(part);
            if !code.is_empty() && code != NONE_TOKEN {
                codes.insert(code);
            }
        }

        if codes.is_empty() && !bus {
            return;
        }

        *self = SelectionState::Subset { codes, bus };
    }

    /// Reset to the unrestricted default.
    pub fn select_all(&mut self) {
        *self = SelectionState::All;
    }

    /// Explicitly hide everything.
    pub fn clear(&mut self) {
        *self = SelectionState::None;
    }

    /// Whether everything is hidden.
    pub fn is_none(&self) -> bool {
        matches!(self, SelectionState::None)
    }

    /// Whether a vehicle with the given canonical line code passes the
    /// filter. Buses pass when the bus flag is set or their own line code is
    /// selected; rail vehicles pass on code membership only.
    pub fn is_visible(&self, line: &str, is_bus: bool) -> bool {
        match self {
            SelectionState::None => false,
            SelectionState::All => true,
            SelectionState::Subset { codes, bus } => {
                if is_bus && *bus {
                    true
                } else {
                    codes.contains(line)
                }
            }
        }
    }

    /// Whether an individual line code counts as selected.
    pub fn line_selected(&self, raw: &str) -> bool {
        match self {
            SelectionState::None => false,
            SelectionState::All => true,
            SelectionState::Subset { codes, .. } => codes.contains(&normalize(raw)),
        }
    }

    /// Whether any line of a mode group is selected.
    pub fn mode_active(&self, mode: crate::line::TransitMode) -> bool {
        match self {
            SelectionState::None => false,
            SelectionState::All => true,
            SelectionState::Subset { .. } => {
                mode.lines().iter().any(|line| self.line_selected(line))
            }
        }
    }

    /// Whether the bus group should read as active.
    ///
    /// With an explicit subset the group is active when the bus flag is set,
    /// or when any ordinary code is selected (a selected number may well be
    /// a bus line; the vehicle kind is not knowable from the code alone).
    pub fn bus_active(&self) -> bool {
        match self {
            SelectionState::None => false,
            SelectionState::All => true,
            SelectionState::Subset { codes, bus } => *bus || !codes.is_empty(),
        }
    }

    /// Serialize to the persisted token array.
    pub fn tokens(&self) -> Vec<String> {
        match self {
            SelectionState::All => Vec::new(),
            SelectionState::None => vec![NONE_TOKEN.to_string()],
            SelectionState::Subset { codes, bus } => {
                let mut out: Vec<String> = codes.iter().cloned().collect();
                if *bus {
                    out.push(BUS_TOKEN.to_string());
                }
                out
            }
        }
    }

    /// Rebuild from a persisted token array.
    ///
    /// An empty array is the unrestricted default. The hide-everything token
    /// wins over anything else it was stored alongside.
    pub fn from_tokens<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut codes = BTreeSet::new();
        let mut bus = false;
        let mut none = false;
        let mut any = false;

        for token in tokens {
            let token = token.as_ref();
            any = true;
            if token == NONE_TOKEN {
                none = true;
            } else if token == BUS_TOKEN {
                bus = true;
            } else {
                let code = normalize(token);
                if !code.is_empty() {
                    codes.insert(code);
                }
            }
        }

        if none {
            SelectionState::None
        } else if !any || (codes.is_empty() && !bus) {
            SelectionState::All
        } else {
            SelectionState::Subset { codes, bus }
        }
    }
}
