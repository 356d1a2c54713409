use std::fmt;

/// One of the four analysis stages, in pipeline order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StageName {
    Creative,
    Finance,
    Inventory,
    Lead,
}

/// Response key carrying the coordinated campaign plan.
pub const FINAL_PLAN_KEY: &str = "Final Plan";

impl StageName {
    pub const ALL: [StageName; 4] = [
        StageName::Creative,
        StageName::Finance,
        StageName::Inventory,
        StageName::Lead,
    ];

    pub fn index(self) -> usize {
        match self {
            StageName::Creative => 0,
            StageName::Finance => 1,
            StageName::Inventory => 2,
            StageName::Lead => 3,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Key of this stage in the analysis service response.
    pub fn wire_key(self) -> &'static str {
        match self {
            StageName::Creative => "Creative",
            StageName::Finance => "Finance",
            StageName::Inventory => "Inventory",
            StageName::Lead => "Lead",
        }
    }

    /// Secondary response key consulted when `wire_key` is absent.
    pub fn fallback_key(self) -> Option<&'static str> {
        match self {
            StageName::Lead => Some(FINAL_PLAN_KEY),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            StageName::Creative => "Creative Agent",
            StageName::Finance => "Finance Agent",
            StageName::Inventory => "Inventory Agent",
            StageName::Lead => "Lead Agent",
        }
    }

    pub fn glyph(self) -> &'static str {
        match self {
            StageName::Creative => "🎨",
            StageName::Finance => "💰",
            StageName::Inventory => "📦",
            StageName::Lead => "🎯",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL.into_iter().find(|stage| {
            stage.wire_key().eq_ignore_ascii_case(name) || stage.label().eq_ignore_ascii_case(name)
        })
    }
}

impl fmt::Display for StageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_key())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

impl StageStatus {
    fn rank(self) -> u8 {
        match self {
            StageStatus::Pending => 0,
            StageStatus::Running => 1,
            StageStatus::Completed | StageStatus::Failed => 2,
        }
    }

    pub fn is_terminal(self) -> bool {
        self.rank() == 2
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageResult {
    pub name: StageName,
    pub raw_text: Option<String>,
    pub status: StageStatus,
}

impl StageResult {
    pub fn pending(name: StageName) -> Self {
        Self {
            name,
            raw_text: None,
            status: StageStatus::Pending,
        }
    }

    pub fn has_results(&self) -> bool {
        self.raw_text
            .as_deref()
            .is_some_and(|text| !text.trim().is_empty())
    }

    /// Moves to `running` unless the stage is already further along.
    pub(crate) fn mark_running(&mut self) -> bool {
        self.advance(StageStatus::Running)
    }

    pub(crate) fn complete(&mut self, text: String) -> bool {
        if self.advance(StageStatus::Completed) {
            self.raw_text = Some(text);
            true
        } else {
            false
        }
    }

    pub(crate) fn fail(&mut self) -> bool {
        self.advance(StageStatus::Failed)
    }

    // Terminal states never change, and nothing moves backwards.
    fn advance(&mut self, next: StageStatus) -> bool {
        if self.status.is_terminal() || next.rank() <= self.status.rank() {
            return false;
        }
        self.status = next;
        true
    }
}
