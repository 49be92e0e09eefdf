//! 各阶段的提示词模板
//!
//! 模板由 minijinja 渲染，占位符写作 `{{ name }}`；示例JSON里的单个花括号原样保留。

use minijinja::{Environment, Error, ErrorKind};
use serde::Serialize;
use std::sync::LazyLock;

/// 阶段1：生成菜谱搜索查询
pub const RECIPE_SEARCH_INSTRUCTIONS: &str = r#"Generate a web search query to find recipes that match the user's preferences.

<USER_PREFERENCES>
Location: {{ location }}
Cuisine: {{ cuisine }}
Dietary Restrictions: {{ restrictions }}
Flavor Profile: {{ flavor }}
</USER_PREFERENCES>

Format your response as a JSON object with these keys:
- "query": The search query string
- "rationale": Brief explanation of why this query matches preferences

Example:
{
    "query": "healthy vegetarian thai curry recipe spicy",
    "rationale": "Matches user's Thai cuisine preference and vegetarian restriction"
}
"#;

/// 阶段2：从搜索结果中提取菜谱
pub const RECIPE_EXTRACTION_PROMPT: &str = r#"Extract recipe information from the search results and format it as a valid JSON object.

<SEARCH_RESULTS>
{{ search_results }}
</SEARCH_RESULTS>

Return a JSON object with exactly these keys:
{
    "recipe_name": "Name of the recipe",
    "ingredients": [
        {
            "quantity": "numeric amount",
            "unit": "measurement unit (e.g., cup, tablespoon, etc.)",
            "name": "ingredient name"
        }
    ],
    "instructions": [
        "Step 1 instruction",
        "Step 2 instruction",
        "etc."
    ]
}

If no clear recipe is found in the search results, return a basic recipe structure with placeholder values.

Example response:
{
    "recipe_name": "Spicy Vegetarian Pasta",
    "ingredients": [
        {
            "quantity": "16",
            "unit": "oz",
            "name": "penne pasta"
        },
        {
            "quantity": "2",
            "unit": "tablespoons",
            "name": "olive oil"
        }
    ],
    "instructions": [
        "Boil water in a large pot",
        "Cook pasta according to package directions",
        "Heat olive oil in a pan"
    ]
}"#;

/// 阶段3：生成商店搜索查询
pub const STORE_SEARCH_INSTRUCTIONS: &str = r#"Generate a web search query to find grocery stores near the user that likely stock the needed ingredients.

<LOCATION>
{{ location }}
</LOCATION>

<INGREDIENTS>
{{ ingredients }}
</INGREDIENTS>

Format your response as a JSON object with these keys:
- "query": The search query string
- "specialty_items": List of ingredients that might need specialty stores

Example:
{
    "query": "asian grocery stores near downtown seattle",
    "specialty_items": ["kaffir lime leaves", "galangal"]
}
"#;

/// 阶段3：从搜索结果中提取商店
pub const STORE_EXTRACTION_PROMPT: &str = r#"Extract grocery store information from the search results.

<SEARCH_RESULTS>
{{ search_content }}
</SEARCH_RESULTS>

Return a JSON array of stores in this exact format:
{
    "stores": [
        {
            "name": "Store name",
            "address": "Store address",
            "specialty_items": ["item1", "item2"]
        }
    ]
}

Example response:
{
    "stores": [
        {
            "name": "Whole Foods Market",
            "address": "123 Main St, San Diego, CA 92101",
            "specialty_items": ["organic produce", "vegan options"]
        },
        {
            "name": "Trader Joe's",
            "address": "456 Market St, San Diego, CA 92102",
            "specialty_items": ["specialty pasta", "vegetarian items"]
        }
    ]
}"#;

/// 阶段4：最终报告
pub const FINAL_REPORT_TEMPLATE: &str = r#"# Meal Planning Report

## Recipe: {{ recipe_name }}

### Recommended Stores:
{{ store_recommendations }}

### Shopping List:
{{ ingredients }}

### Cooking Instructions:
{{ instructions }}

*All store recommendations and prices are approximate. Please call ahead to confirm availability.*
"#;

/// 各次模型调用的任务消息
pub const RECIPE_QUERY_TASK: &str = "Generate a recipe search query:";
pub const RECIPE_EXTRACTION_TASK: &str = "Extract and format the recipe information as JSON:";
pub const STORE_QUERY_TASK: &str = "Generate a store search query:";
pub const STORE_EXTRACTION_TASK: &str = "Extract and format the store information as JSON:";

/// 模板名
pub const RECIPE_SEARCH: &str = "recipe_search";
pub const RECIPE_EXTRACTION: &str = "recipe_extraction";
pub const STORE_SEARCH: &str = "store_search";
pub const STORE_EXTRACTION: &str = "store_extraction";
pub const FINAL_REPORT: &str = "final_report";

static PROMPTS: LazyLock<Result<Environment<'static>, Error>> = LazyLock::new(build_environment);

fn build_environment() -> Result<Environment<'static>, Error> {
    let mut env = Environment::new();
    env.set_keep_trailing_newline(true);
    env.add_template(RECIPE_SEARCH, RECIPE_SEARCH_INSTRUCTIONS)?;
    env.add_template(RECIPE_EXTRACTION, RECIPE_EXTRACTION_PROMPT)?;
    env.add_template(STORE_SEARCH, STORE_SEARCH_INSTRUCTIONS)?;
    env.add_template(STORE_EXTRACTION, STORE_EXTRACTION_PROMPT)?;
    env.add_template(FINAL_REPORT, FINAL_REPORT_TEMPLATE)?;
    Ok(env)
}

/// 按模板名渲染，上下文一般由 `minijinja::context!` 构造
pub fn render<S: Serialize>(name: &str, ctx: S) -> Result<String, Error> {
    let env = PROMPTS.as_ref().map_err(|e| {
        Error::new(
            ErrorKind::InvalidOperation,
            format!("prompt templates failed to load: {}", e),
        )
    })?;
    env.get_template(name)?.render(ctx)
}
