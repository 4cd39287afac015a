use crate::output::{describe_outcome, print_json};
use anyhow::{anyhow, bail, Context};
use deck_core::{platform, ActionDescriptor, ActionExecutor, Platform, TokioRunner};
use std::sync::Arc;
use serde_json::{Map, Value};

/// Build the params map: `--json-params` first, then each `key=value` on top.
///
/// `--param` values are always strings; numeric params accept numeric strings.
pub(crate) fn build_params(pairs: &[String], json_params: Option<&str>) -> anyhow::Result<Map<String, Value>> {
    let mut params = match json_params {
        Some(raw) => match serde_json::from_str::<Value>(raw).context("invalid --json-params")? {
            Value::Object(map) => map,
            other => bail!("--json-params must be a JSON object, got {other}"),
        },
        None => Map::new(),
    };
    for pair in pairs {
        let (key, value) = pair
            .split_once('=')
            .ok_or_else(|| anyhow!("invalid --param '{pair}': expected KEY=VALUE"))?;
        if key.is_empty() {
            bail!("invalid --param '{pair}': empty key");
        }
        params.insert(key.to_string(), Value::String(value.to_string()));
    }
    Ok(params)
}

/// Executor for `name`, or for the running OS when no platform is given.
pub(crate) fn executor_for(name: Option<&str>) -> anyhow::Result<ActionExecutor> {
    match name {
        Some(name) => {
            let target = name.parse::<Platform>().map_err(|e| anyhow!(e))?;
            Ok(ActionExecutor::new(
                platform::for_platform(target),
                Arc::new(TokioRunner),
            ))
        }
        None => Ok(ActionExecutor::native()),
    }
}

pub fn run(
    kind: &str,
    pairs: &[String],
    json_params: Option<&str>,
    dry_run: bool,
    platform: Option<&str>,
    json: bool,
) -> anyhow::Result<()> {
    let descriptor = ActionDescriptor::new(kind, build_params(pairs, json_params)?);
    let executor = executor_for(platform)?;

    if dry_run {
        return show_command(&executor, &descriptor, json);
    }

    let rt = tokio::runtime::Runtime::new()?;
    let outcome = rt.block_on(executor.dispatch(&descriptor));

    if json {
        print_json(&outcome)?;
    } else {
        println!("{kind}: {}", describe_outcome(&outcome));
    }
    Ok(())
}

fn show_command(executor: &ActionExecutor, descriptor: &ActionDescriptor, json: bool) -> anyhow::Result<()> {
    let spec = executor
        .compose(descriptor)
        .with_context(|| format!("cannot run '{}'", descriptor.kind))?;

    if json {
        return print_json(&serde_json::json!({
            "platform": executor.platform().as_str(),
            "command": spec.as_ref().map(|s| s.to_string()),
            "stdin": spec.as_ref().and_then(|s| s.stdin.clone()),
        }));
    }
    match spec {
        Some(spec) => println!("{spec}"),
        None => println!(
            "(no command for '{}' on {})",
            descriptor.kind,
            executor.platform()
        ),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn pairs_override_json_params() {
        let params = build_params(
            &["x=10".to_string(), "url=https://a.example/?q=1".to_string()],
            Some(r#"{"x": 1, "y": 2}"#),
        )
        .unwrap();
        assert_eq!(params["x"], json!("10"));
        assert_eq!(params["y"], json!(2));
        assert_eq!(params["url"], json!("https://a.example/?q=1"));
    }

    #[test]
    fn rejects_malformed_input() {
        assert!(build_params(&["novalue".to_string()], None).is_err());
        assert!(build_params(&["=x".to_string()], None).is_err());
        assert!(build_params(&[], Some("[1, 2]")).is_err());
        assert!(build_params(&[], Some("{not json")).is_err());
    }

    #[test]
    fn platform_override_selects_composer() {
        assert_eq!(
            executor_for(Some("darwin")).unwrap().platform(),
            Platform::MacOs
        );
        assert_eq!(
            executor_for(Some("windows")).unwrap().platform(),
            Platform::Windows
        );
        assert_eq!(executor_for(None).unwrap().platform(), Platform::current());
        let err = executor_for(Some("beos")).unwrap_err();
        assert_eq!(err.to_string(), "unsupported platform: beos");
    }
}
