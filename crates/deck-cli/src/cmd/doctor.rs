use crate::output::{print_json, print_table};
use deck_core::ActionExecutor;

/// Look up every utility the current platform's commands shell out to.
pub fn run(json: bool) -> anyhow::Result<()> {
    let executor = ActionExecutor::native();
    let platform = executor.platform();
    let checks: Vec<(&str, Option<String>)> = executor
        .commands()
        .required_tools()
        .iter()
        .map(|tool| {
            let found = which::which(tool).ok().map(|p| p.display().to_string());
            (*tool, found)
        })
        .collect();
    let missing = checks.iter().filter(|(_, p)| p.is_none()).count();

    if json {
        let tools: Vec<serde_json::Value> = checks
            .iter()
            .map(|(tool, path)| {
                serde_json::json!({ "tool": tool, "found": path.is_some(), "path": path })
            })
            .collect();
        return print_json(&serde_json::json!({
            "platform": platform.as_str(),
            "tools": tools,
            "missing": missing,
        }));
    }

    println!("Platform: {platform}");
    let rows = checks
        .into_iter()
        .map(|(tool, path)| {
            vec![
                tool.to_string(),
                if path.is_some() { "ok" } else { "missing" }.to_string(),
                path.unwrap_or_default(),
            ]
        })
        .collect();
    print_table(&["TOOL", "STATUS", "PATH"], rows);
    if missing > 0 {
        println!("{missing} tool(s) missing; actions that need them will fail.");
    }
    Ok(())
}
