use anyhow::{Context, Result};
use std::time::{Duration, Instant};
use tracing::{Instrument, info_span};
use uuid::Uuid;

use crate::config::Config;
use crate::planner::context::PlannerContext;
use crate::planner::stages::{
    RecipeExtractionStage, RecipeQueryStage, ReportStage, Stage, StoreSearchStage,
};
use crate::planner::state::{PipelineState, PreferenceRecord};

/// 时间跟踪作用域，按阶段执行顺序记录耗时
pub struct TimingScope {
    start_time: Instant,
    current: Option<(String, Instant)>,
    phase_durations: Vec<(String, Duration)>,
}

impl Default for TimingScope {
    fn default() -> Self {
        Self::new()
    }
}

impl TimingScope {
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            current: None,
            phase_durations: Vec::new(),
        }
    }

    /// 开始一个新的阶段计时
    pub fn start_phase(&mut self, phase_name: &str) {
        self.current = Some((phase_name.to_string(), Instant::now()));
    }

    /// 结束当前阶段的计时
    pub fn end_phase(&mut self, phase_name: &str) -> Option<Duration> {
        match self.current.take() {
            Some((name, started)) if name == phase_name => {
                let duration = started.elapsed();
                self.phase_durations.push((name, duration));
                Some(duration)
            }
            other => {
                self.current = other;
                None
            }
        }
    }

    pub fn total_duration(&self) -> Duration {
        self.start_time.elapsed()
    }

    pub fn phase_durations(&self) -> &[(String, Duration)] {
        &self.phase_durations
    }

    /// 获取格式化的执行时间报告
    pub fn generate_timing_report(&self) -> String {
        let mut report = format!(
            "总执行时间: {:.2}秒\n",
            self.total_duration().as_secs_f64()
        );

        if !self.phase_durations.is_empty() {
            report.push_str("\n各阶段执行时间:\n");
            for (phase, duration) in &self.phase_durations {
                report.push_str(&format!("- {}: {:.3}秒\n", phase, duration.as_secs_f64()));
            }
        }

        report
    }
}

/// 固定顺序的四个阶段
pub fn default_stages() -> Vec<Box<dyn Stage>> {
    vec![
        Box::new(RecipeQueryStage),
        Box::new(RecipeExtractionStage),
        Box::new(StoreSearchStage),
        Box::new(ReportStage),
    ]
}

/// 依次执行全部阶段，返回最终状态
///
/// 阶段自身吸收的失败不会出现在这里；返回Err说明某个阶段把错误向上传播了，
/// 此时整次运行终止，不产出报告。
pub async fn run_pipeline(
    context: &PlannerContext,
    preferences: PreferenceRecord,
) -> Result<PipelineState> {
    let run_id = Uuid::new_v4();
    let span = info_span!("meal_plan", %run_id, location = %preferences.location());

    async move {
        let mut state = PipelineState::new(preferences);
        let mut timing = TimingScope::new();
        let verbose = context.config.verbose;

        for stage in default_stages() {
            let name = stage.name();
            if verbose {
                println!("🤖 执行阶段 {}...", name);
            }

            timing.start_phase(name);
            let update = stage
                .run(context, &state)
                .instrument(info_span!("pipeline_stage", stage = name))
                .await
                .with_context(|| format!("stage `{}` failed", name))?;
            state.apply(update);

            if let Some(elapsed) = timing.end_phase(name) {
                tracing::info!(stage = name, elapsed_ms = elapsed.as_millis() as u64, "stage finished");
            }
            if verbose {
                println!("✓ 阶段 {} 完成", name);
            }
        }

        tracing::debug!("{}", timing.generate_timing_report());
        tracing::info!(
            elapsed_ms = timing.total_duration().as_millis() as u64,
            "meal plan finished"
        );
        Ok(state)
    }
    .instrument(span)
    .await
}

/// 运行流水线并返回报告文本
pub async fn run_meal_planner(
    context: &PlannerContext,
    preferences: PreferenceRecord,
) -> Result<String> {
    let state = run_pipeline(context, preferences).await?;
    state
        .final_report
        .context("pipeline finished without producing a report")
}

/// 按配置创建上下文并生成一份膳食计划报告
pub async fn launch(config: &Config, preferences: PreferenceRecord) -> Result<String> {
    let context = PlannerContext::new(config.clone())?;
    run_meal_planner(&context, preferences).await
}
