//! 报告输出

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};

/// 按地点生成报告文件名：小写，空格和路径分隔符替换为下划线
pub fn report_filename(location: &str) -> String {
    format!(
        "meal_plan_{}.md",
        location.to_lowercase().replace([' ', '/', '\\'], "_")
    )
}

/// 在报告前加上生成时间
pub fn with_timestamp(report: &str, generated_at: DateTime<Local>) -> String {
    format!(
        "*Generated on: {}*\n\n{}",
        generated_at.format("%Y-%m-%d %H:%M:%S"),
        report
    )
}

#[allow(async_fn_in_trait)]
pub trait Outlet {
    /// 保存报告，返回写入位置
    async fn save(&self, location: &str, report: &str) -> Result<PathBuf>;
}

/// 把报告写入本地目录
pub struct DiskOutlet {
    output_dir: PathBuf,
}

impl DiskOutlet {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }
}

impl Outlet for DiskOutlet {
    async fn save(&self, location: &str, report: &str) -> Result<PathBuf> {
        tokio::fs::create_dir_all(&self.output_dir)
            .await
            .with_context(|| format!("Failed to create output dir: {:?}", self.output_dir))?;

        let path = self.output_dir.join(report_filename(location));
        let content = with_timestamp(report, Local::now());
        tokio::fs::write(&path, content)
            .await
            .with_context(|| format!("Failed to write meal plan: {:?}", path))?;

        tracing::info!(path = %path.display(), "meal plan saved");
        Ok(path)
    }
}
