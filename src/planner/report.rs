//! 报告格式化，均为纯函数

use minijinja::context;

use crate::planner::prompts::{FINAL_REPORT, render};
use crate::planner::state::{Ingredient, PipelineState, StoreRecommendation};

/// 从未设置菜谱名时的占位
pub const UNKNOWN_RECIPE: &str = "Unknown Recipe";

/// 购物清单，每种食材一行，空白的组成部分直接省略
pub fn format_shopping_list(ingredients: &[Ingredient]) -> String {
    ingredients
        .iter()
        .map(|item| {
            let parts: Vec<&str> = [&item.quantity, &item.unit, &item.name]
                .into_iter()
                .map(|part| part.trim())
                .filter(|part| !part.is_empty())
                .collect();
            format!("- {}", parts.join(" ")).trim().to_string()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn format_store_recommendations(stores: &[StoreRecommendation]) -> String {
    stores
        .iter()
        .map(|store| {
            let mut block = format!("* {} - {}", store.name, store.address);
            if !store.specialty_items.is_empty() {
                block.push_str(&format!(
                    "\n  Recommended for: {}",
                    store.specialty_items.join(", ")
                ));
            }
            block
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// 从1开始编号的步骤
pub fn format_instructions(instructions: &[String]) -> String {
    instructions
        .iter()
        .enumerate()
        .map(|(i, step)| format!("{}. {}", i + 1, step))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_report(state: &PipelineState) -> Result<String, minijinja::Error> {
    render(
        FINAL_REPORT,
        context! {
            recipe_name => state.recipe_name.as_deref().unwrap_or(UNKNOWN_RECIPE),
            store_recommendations => format_store_recommendations(&state.store_recommendations),
            ingredients => format_shopping_list(&state.ingredients),
            instructions => format_instructions(&state.instructions),
        },
    )
}
