//! MarketBridge core: pure state machine, progress pacing and section parsing.
mod coordinator;
mod effect;
mod msg;
mod packet;
mod parser;
mod plan;
mod progress;
mod results;
mod scheduler;
mod stage;
mod state;
mod update;
mod view_model;

pub use coordinator::{SubmissionCoordinator, SubmissionError};
pub use effect::Effect;
pub use msg::Msg;
pub use packet::{AnalysisOutcome, StageTexts, SubmissionFailure, SubmissionId, TransferPacket};
pub use parser::{
    is_header_line, normalize, parse_blocks, strip_bullet_marker, BlockKind, ContentBlock,
    HEADER_KEYWORDS, SECTION_MARKERS,
};
pub use plan::{summarize_plan, PlanSummary, PlanVerdict};
pub use progress::{PacingConfig, ProgressOrchestrator, ProgressState, ProgressUpdate};
pub use results::{ResultsPhase, ResultsView};
pub use scheduler::{CancelToken, Fired, TimerId, TimerQueue};
pub use stage::{StageName, StageResult, StageStatus, FINAL_PLAN_KEY};
pub use state::AppState;
pub use update::update;
pub use view_model::{AppViewModel, ProgressView, StageCardView};
