use async_trait::async_trait;

use super::{Stage, StageError};
use crate::planner::context::PlannerContext;
use crate::planner::report::render_report;
use crate::planner::state::{PipelineState, StateUpdate};

/// 阶段4：渲染最终报告，不调用任何外部服务
#[derive(Debug, Default)]
pub struct ReportStage;

#[async_trait]
impl Stage for ReportStage {
    fn name(&self) -> &'static str {
        "report"
    }

    async fn run(
        &self,
        _context: &PlannerContext,
        state: &PipelineState,
    ) -> Result<StateUpdate, StageError> {
        Ok(StateUpdate {
            final_report: Some(render_report(state)?),
            ..Default::default()
        })
    }
}
